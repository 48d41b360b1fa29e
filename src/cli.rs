use anyhow::{Result, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::{BuildMarker, ProjectCode};

#[derive(Parser, Debug)]
#[command(
    name = "jenkins-jira-sync",
    version,
    about = "Mark Jira issues fixed by the commits of a Jenkins build",
    long_about = None
)]
pub struct Cli {
  /// Jenkins job name; folder jobs as `folder/job`
  #[arg(required_unless_present = "gen_man")]
  pub job_name: Option<String>,

  /// Build number that was just produced
  #[arg(required_unless_present = "gen_man", value_parser = clap::value_parser!(u64).range(1..))]
  pub build_number: Option<u64>,

  /// Settings file with named server profiles (default: $JJS_CONFIG)
  #[arg(long)]
  pub config: Option<PathBuf>,

  /// Profile to use from the settings file
  #[arg(long)]
  pub profile: Option<String>,

  /// Last build already reconciled; defaults to the job's last successful build
  #[arg(long)]
  pub since_build: Option<u64>,

  /// Project code (PDM, WGD, WCI, WCE, TP) instead of deriving it from the job name
  #[arg(long)]
  pub project: Option<String>,

  /// Tracker transition that marks an issue as built
  #[arg(long)]
  pub transition: Option<String>,

  /// Report destination: file path, or "-" for stdout
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Log at debug level unless RUST_LOG says otherwise
  #[arg(long, short = 'v')]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the report timestamp, RFC3339 (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub job_name: String,
  pub build_number: BuildMarker,
  pub since_build: Option<BuildMarker>,
  pub project: Option<ProjectCode>,
  pub config: Option<PathBuf>,
  pub profile: Option<String>,
  pub transition: Option<String>,
  pub out: String,
  pub verbose: bool,
  pub now_override: Option<String>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let (job_name, build_number) = match (cli.job_name, cli.build_number) {
    (Some(j), Some(b)) => (j, b),
    _ => bail!("Provide both JOB_NAME and BUILD_NUMBER"),
  };
  let job_name = job_name.trim().to_string();
  if job_name.is_empty() {
    bail!("JOB_NAME must not be empty");
  }

  if let Some(p) = cli.since_build {
    if p >= build_number {
      bail!("--since-build {} must be lower than BUILD_NUMBER {}", p, build_number);
    }
  }

  let project = match cli.project.as_deref() {
    None => None,
    Some(raw) => match ProjectCode::parse(raw) {
      Some(code) => Some(code),
      None => bail!("Unknown --project `{}`: expected one of PDM, WGD, WCI, WCE, TP", raw),
    },
  };

  let transition = cli.transition.map(|t| t.trim().to_string());
  if transition.as_deref() == Some("") {
    bail!("--transition must not be empty");
  }

  Ok(EffectiveConfig {
    job_name,
    build_number,
    since_build: cli.since_build,
    project,
    config: cli.config,
    profile: cli.profile,
    transition,
    out: cli.out,
    verbose: cli.verbose,
    now_override: cli.now_override,
  })
}
