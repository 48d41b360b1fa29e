use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod cli;
mod config;
mod error;
mod ext;
mod extract;
mod fakes;
mod jenkins;
mod jira;
mod model;
mod project;
mod range;
mod render;
mod sync;
mod transition;
mod util;
mod version;

use crate::cli::{Cli, normalize};

fn init_tracing(verbose: bool) {
  let fallback = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .with_target(false)
    .try_init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  init_tracing(cfg.verbose);

  // Phase 2: settings and collaborators
  let settings = config::load(cfg.config.as_deref(), cfg.profile.as_deref(), cfg.transition.as_deref())?;
  tracing::debug!(profile = %settings.profile_name, jenkins = %settings.profile.jenkins.url, jira = %settings.profile.jira.url, "using profile");
  let server = jenkins::build_server(&settings.profile.jenkins)?;
  let tracker = jira::build_tracker(&settings.profile.jira)?;

  // Phase 3: reconcile and report
  let request = sync::SyncRequest {
    job_name: cfg.job_name.clone(),
    build_number: cfg.build_number,
    since_build: cfg.since_build,
    project: cfg.project,
    transition: settings.transition.clone(),
    now: util::parse_now(cfg.now_override.as_deref())?,
  };
  let report = sync::run(server.as_ref(), tracker.as_ref(), &request)?;
  render::write_report(&report, &cfg.out)
}
