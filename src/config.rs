// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load server endpoints/credentials per named profile and pick the one a run uses
// role: configuration/settings
// inputs: optional JSON settings file (--config or JJS_CONFIG); env JENKINS_* / JIRA_* overrides
// outputs: Settings with a resolved Profile { jenkins, jira } and the tracker transition name
// side_effects: Reads one file; reads process env
// invariants:
// - Env overrides are applied after the file, per field
// - A selected profile always has non-empty jenkins.url and jira.url
// - Secrets never appear in Debug output
// errors: Missing/unreadable file, bad JSON, unknown profile, missing URL; all name the offending input
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub const DEFAULT_TRANSITION: &str = "Built";

#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
  #[serde(default)]
  pub url: String,
  #[serde(default)]
  pub principal: String,
  #[serde(default)]
  pub secret: String,
}

impl fmt::Debug for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Endpoint")
      .field("url", &self.url)
      .field("principal", &self.principal)
      .field("secret", &if self.secret.is_empty() { "" } else { "***" })
      .finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
  #[serde(default)]
  pub jenkins: Endpoint,
  #[serde(default)]
  pub jira: Endpoint,
}

/// On-disk shape of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
  #[serde(default)]
  pub default_profile: Option<String>,
  #[serde(default)]
  pub transition: Option<String>,
  #[serde(default)]
  pub profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Clone)]
pub struct Settings {
  pub profile_name: String,
  pub profile: Profile,
  pub transition: String,
}

pub fn read_settings_file(path: &Path) -> Result<SettingsFile> {
  let data = std::fs::read(path).with_context(|| format!("reading settings {}", path.display()))?;
  serde_json::from_slice(&data).with_context(|| format!("parsing settings {}", path.display()))
}

fn env_override(slot: &mut String, var: &str) {
  if let Ok(v) = std::env::var(var) {
    if !v.trim().is_empty() {
      *slot = v.trim().to_string();
    }
  }
}

fn apply_env(profile: &mut Profile) {
  env_override(&mut profile.jenkins.url, "JENKINS_URL");
  env_override(&mut profile.jenkins.principal, "JENKINS_USER");
  env_override(&mut profile.jenkins.secret, "JENKINS_TOKEN");
  env_override(&mut profile.jira.url, "JIRA_URL");
  env_override(&mut profile.jira.principal, "JIRA_USER");
  env_override(&mut profile.jira.secret, "JIRA_TOKEN");
}

fn select_profile(file: &SettingsFile, requested: Option<&str>) -> Result<(String, Profile)> {
  let name = match (requested, file.default_profile.as_deref()) {
    (Some(r), _) => Some(r.to_string()),
    (None, Some(d)) => Some(d.to_string()),
    (None, None) if file.profiles.len() == 1 => file.profiles.keys().next().cloned(),
    (None, None) if file.profiles.is_empty() => None,
    (None, None) => bail!(
      "several profiles configured ({}); choose one with --profile",
      file.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    ),
  };

  match name {
    Some(n) => match file.profiles.get(&n) {
      Some(p) => Ok((n, p.clone())),
      None => bail!("unknown profile `{}`", n),
    },
    None => Ok(("env".to_string(), Profile::default())),
  }
}

/// Resolve the settings for one run.
///
/// `file` is `None` when neither `--config` nor `JJS_CONFIG` was given, in
/// which case every endpoint must come from the environment.
pub fn resolve(file: Option<&SettingsFile>, requested_profile: Option<&str>, transition: Option<&str>) -> Result<Settings> {
  let empty = SettingsFile::default();
  let file = file.unwrap_or(&empty);

  let (profile_name, mut profile) = select_profile(file, requested_profile)?;
  apply_env(&mut profile);

  if profile.jenkins.url.is_empty() {
    bail!("profile `{}`: jenkins.url is not set (config file or JENKINS_URL)", profile_name);
  }
  if profile.jira.url.is_empty() {
    bail!("profile `{}`: jira.url is not set (config file or JIRA_URL)", profile_name);
  }

  let transition = transition
    .map(str::to_string)
    .or_else(|| file.transition.clone())
    .unwrap_or_else(|| DEFAULT_TRANSITION.to_string());

  Ok(Settings { profile_name, profile, transition })
}

/// Load settings from `path` (or `JJS_CONFIG`) and resolve the requested profile.
pub fn load(path: Option<&Path>, requested_profile: Option<&str>, transition: Option<&str>) -> Result<Settings> {
  let from_env = std::env::var("JJS_CONFIG").ok().filter(|s| !s.trim().is_empty());
  let file = match (path, from_env) {
    (Some(p), _) => Some(read_settings_file(p)?),
    (None, Some(p)) => Some(read_settings_file(Path::new(&p))?),
    (None, None) => None,
  };
  resolve(file.as_ref(), requested_profile, transition)
}
