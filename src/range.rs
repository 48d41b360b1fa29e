// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Collect the commits of every build in (previous, current] for one job
// role: processing/change-range
// inputs: BuildServer, job name, previous marker, current marker
// outputs: CommitRange { current build info, commits in build order then changeset order }
// side_effects: Read-only build-server queries
// invariants:
// - Only builds b with previous < b <= current are fetched
// - Builds are visited in ascending number; commits keep source order inside a build
// - Unknown job or a current marker missing from the job fails before any tracker call
// errors: SyncError::JobNotFound / RangeNotFound / NoPreviousBuild; transport errors propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::jenkins::BuildServer;
use crate::model::{BuildInfo, BuildMarker, Commit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
  pub current: BuildInfo,
  pub builds: Vec<BuildMarker>,
  pub commits: Vec<Commit>,
}

/// Resolve the lower bound of the range: an explicit marker, or the job's last good build.
pub fn previous_marker(server: &dyn BuildServer, job: &str, explicit: Option<BuildMarker>) -> Result<BuildMarker> {
  if let Some(p) = explicit {
    return Ok(p);
  }
  match server.last_good_build(job)? {
    Some(p) => Ok(p),
    None if server.list_builds(job)?.is_none() => Err(SyncError::JobNotFound { job_name: job.to_string() }.into()),
    None => Err(SyncError::NoPreviousBuild { job_name: job.to_string() }.into()),
  }
}

pub fn collect(
  server: &dyn BuildServer,
  job: &str,
  previous: BuildMarker,
  current: BuildMarker,
) -> Result<CommitRange> {
  let known = server
    .list_builds(job)?
    .ok_or_else(|| SyncError::JobNotFound { job_name: job.to_string() })?;

  if !known.contains(&current) {
    return Err(SyncError::RangeNotFound { job_name: job.to_string(), build: current }.into());
  }

  let mut builds: Vec<BuildMarker> = known.into_iter().filter(|b| previous < *b && *b <= current).collect();
  builds.sort_unstable();
  builds.dedup();

  if builds.is_empty() {
    warn!(job, previous, current, "no builds in range; nothing to reconcile");
  }

  let mut commits: Vec<Commit> = Vec::new();
  let mut current_info: Option<BuildInfo> = None;

  for number in builds.iter().copied() {
    let changes = server
      .get_build(job, number)?
      .ok_or_else(|| SyncError::RangeNotFound { job_name: job.to_string(), build: number })?;
    debug!(job, build = number, commits = changes.commits.len(), "collected build");

    if number == current {
      current_info = Some(changes.info.clone());
    }
    commits.extend(changes.commits);
  }

  // current <= previous leaves the current build out of the walk; its URL is still reported.
  let current = match current_info {
    Some(info) => info,
    None => {
      server
        .get_build(job, current)?
        .ok_or_else(|| SyncError::RangeNotFound { job_name: job.to_string(), build: current })?
        .info
    }
  };

  Ok(CommitRange { current, builds, commits })
}
