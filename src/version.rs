// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Make sure the run's fix-version exists in the tracker project and return its id
// role: reconciliation/version
// inputs: Tracker, project key, version name
// outputs: VersionId of the exact-name match, or of a newly created released version
// side_effects: At most one create call per invocation; none when the name already exists
// invariants:
// - Name match is exact (case-sensitive)
// - Created versions are released and carry AUTO_DESCRIPTION
// - Concurrent runs for the same name are not coordinated; one invoker per (project, name)
// errors: Tracker list/create failures propagate and abort the run before any issue write
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use tracing::info;

use crate::jira::Tracker;
use crate::model::VersionId;

pub const AUTO_DESCRIPTION: &str = "Created automatically by jenkins-jira-sync";

/// Look up `name` among the project's versions without writing anything.
pub fn find_version(tracker: &dyn Tracker, project: &str, name: &str) -> Result<Option<VersionId>> {
  let versions = tracker
    .list_versions(project)
    .with_context(|| format!("listing versions of {}", project))?;
  Ok(versions.into_iter().find(|v| v.name == name).map(|v| v.id))
}

pub fn ensure_version(tracker: &dyn Tracker, project: &str, name: &str) -> Result<VersionId> {
  if let Some(id) = find_version(tracker, project, name)? {
    info!(project, version = name, id = %id, "fix-version already exists");
    return Ok(id);
  }

  let id = tracker
    .create_version(project, name, AUTO_DESCRIPTION, true)
    .with_context(|| format!("creating version `{}` in {}", name, project))?;
  info!(project, version = name, id = %id, "created fix-version");
  Ok(id)
}
