// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the value types flowing through one sync run (commits, project info, fix records, report)
// role: model/types
// outputs: Serializable structs with stable field names shared by every stage and the JSON report
// invariants:
// - Every value is built once per run and never mutated after it is handed downstream
// - FixRecord.issue_id is canonical upper-case PREFIX-NUMBER
// - Report field names are covered by tests/schemas/sync-report.schema.json; additive changes only
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal build number within one job.
pub type BuildMarker = u64;

/// One commit record as reported by the build server changeset.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Commit {
  pub id: String,
  pub author: String,
  pub message: String,
}

/// Build-level metadata of the build a run is reconciling.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BuildInfo {
  pub number: BuildMarker,
  pub url: String,
}

/// Commits of one build, in the order the build server reports them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BuildChanges {
  pub info: BuildInfo,
  pub commits: Vec<Commit>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum BuildEnv {
  Alpha,
  Beta,
  Build,
}

impl BuildEnv {
  /// Prefix used in the fix-version name, e.g. `Beta` in `Beta#193`.
  pub fn version_label(self) -> &'static str {
    match self {
      BuildEnv::Alpha => "Alpha",
      BuildEnv::Beta => "Beta",
      BuildEnv::Build => "Build",
    }
  }

  /// Tag matched against issue labels by the environment gate.
  pub fn tag(self) -> &'static str {
    match self {
      BuildEnv::Alpha => "Alpha",
      BuildEnv::Beta => "Beta",
      BuildEnv::Build => "Production",
    }
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Platform {
  #[serde(rename = "iOS")]
  Ios,
  Android,
  Web,
  Server,
}

impl Platform {
  pub fn tag(self) -> &'static str {
    match self {
      Platform::Ios => "iOS",
      Platform::Android => "Android",
      Platform::Web => "Web",
      Platform::Server => "Server",
    }
  }
}

/// Issue labels recognised by the platform gate.
pub const PLATFORM_TAGS: [&str; 4] = ["iOS", "Android", "Web", "Server"];

/// Issue labels recognised by the environment gate.
pub const ENV_TAGS: [&str; 4] = ["Alpha", "Beta", "Production", "Distribution"];

/// Tracker project codes known to the job-name classifier.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum ProjectCode {
  #[serde(rename = "PDM")]
  Pdm,
  #[serde(rename = "WGD")]
  Wgd,
  #[serde(rename = "WCI")]
  Wci,
  #[serde(rename = "WCE")]
  Wce,
  #[serde(rename = "TP")]
  Tp,
}

impl ProjectCode {
  pub fn as_str(self) -> &'static str {
    match self {
      ProjectCode::Pdm => "PDM",
      ProjectCode::Wgd => "WGD",
      ProjectCode::Wci => "WCI",
      ProjectCode::Wce => "WCE",
      ProjectCode::Tp => "TP",
    }
  }

  /// Parse a code given explicitly (e.g. `--project wci`).
  pub fn parse(code: &str) -> Option<ProjectCode> {
    match code.trim().to_ascii_uppercase().as_str() {
      "PDM" => Some(ProjectCode::Pdm),
      "WGD" => Some(ProjectCode::Wgd),
      "WCI" => Some(ProjectCode::Wci),
      "WCE" => Some(ProjectCode::Wce),
      "TP" => Some(ProjectCode::Tp),
      _ => None,
    }
  }
}

impl fmt::Display for ProjectCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
  pub project_code: ProjectCode,
  pub build_env: BuildEnv,
  pub platform: Option<Platform>,
  pub job_name: String,
  pub target_build_number: BuildMarker,
}

impl ProjectInfo {
  /// Fix-version name for this run, e.g. `Beta#193`.
  pub fn version_name(&self) -> String {
    format!("{}#{}", self.build_env.version_label(), self.target_build_number)
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FixRecord {
  pub issue_id: String,
  pub comment: String,
  pub assignee: String,
  pub version_name: String,
}

/// Tracker-assigned id of a named release.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct VersionId(pub String);

impl fmt::Display for VersionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Everything downstream stages need, built once by the aggregator.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BugfixBatch {
  pub fix_records: Vec<FixRecord>,
  pub project_code: ProjectCode,
  pub commit_ids: Vec<String>,
  pub build_env: BuildEnv,
  pub platform: Option<Platform>,
  pub version_name: String,
}

/// An issue that was attempted but not transitioned.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SkippedIssue {
  pub issue_id: String,
  pub outcome: String,
  pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncReport {
  pub job_name: String,
  pub build_number: BuildMarker,
  pub previous_build: BuildMarker,
  pub build_url: String,
  pub generated_at: String,
  pub project: ProjectInfo,
  pub version_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version_id: Option<VersionId>,
  pub commits: Vec<String>,
  pub fix_records: Vec<FixRecord>,
  pub fixed: Vec<String>,
  pub skipped: Vec<SkippedIssue>,
}
