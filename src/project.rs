// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Classify a Jenkins job name into project code, build environment and platform
// role: classification/project
// inputs: job name, target build number, optional explicit project code
// outputs: ProjectInfo, or SyncError::Classification when no project code matches
// invariants:
// - Categories are independent; first matching rule wins within a category
// - Missing env falls back to Build and missing platform to None, each with a warning
// - Missing project code is fatal; nothing downstream runs
// errors: SyncError::Classification carries the job name
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing::warn;

use crate::error::SyncError;
use crate::model::{BuildEnv, BuildMarker, Platform, ProjectCode, ProjectInfo};

pub fn classify_env(job_name: &str) -> BuildEnv {
  if job_name.contains("Beta") {
    BuildEnv::Beta
  } else if job_name.contains("Alpha") {
    BuildEnv::Alpha
  } else {
    warn!(job = job_name, "no build environment in job name; using Build");
    BuildEnv::Build
  }
}

pub fn classify_project(job_name: &str) -> Option<ProjectCode> {
  if job_name.contains("word5") {
    Some(ProjectCode::Pdm)
  } else if job_name.contains("Word") && job_name.contains("V4") {
    Some(ProjectCode::Wgd)
  } else if job_name.contains("Word") && job_name.contains("V1") {
    Some(ProjectCode::Wci)
  } else if job_name.contains("WordCross") {
    Some(ProjectCode::Wce)
  } else if job_name.contains("TestProject") {
    Some(ProjectCode::Tp)
  } else {
    None
  }
}

// `Server` has no job-name marker yet; it can only reach a run through
// tracker labels, never through classification.
pub fn classify_platform(job_name: &str) -> Option<Platform> {
  if job_name.contains("iOS") {
    Some(Platform::Ios)
  } else if job_name.contains("Web") {
    Some(Platform::Web)
  } else if job_name.contains("Android") {
    Some(Platform::Android)
  } else {
    warn!(job = job_name, "no platform in job name; platform gate will only pass untagged issues");
    None
  }
}

/// Resolve everything a run needs to know about the job.
///
/// `explicit_code` skips project-code classification (`--project`); env and
/// platform are still read from the job name.
pub fn resolve(
  job_name: &str,
  target_build_number: BuildMarker,
  explicit_code: Option<ProjectCode>,
) -> Result<ProjectInfo, SyncError> {
  let project_code = explicit_code
    .or_else(|| classify_project(job_name))
    .ok_or_else(|| SyncError::Classification {
      job_name: job_name.to_string(),
    })?;

  Ok(ProjectInfo {
    project_code,
    build_env: classify_env(job_name),
    platform: classify_platform(job_name),
    job_name: job_name.to_string(),
    target_build_number,
  })
}
