// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Run one reconciliation: classify job, collect range, aggregate fixes, ensure version, apply per issue
// role: processing/orchestrator
// inputs: BuildServer, Tracker, SyncRequest (job, build, optional previous marker/project, transition, now)
// outputs: SyncReport with version, commit ids, fix records attempted, fixed issue ids, skipped issues
// side_effects: Tracker writes only after every build-server read has succeeded
// invariants:
// - Classification and range failures abort before any tracker call
// - Records are applied in commit order; an issue already fixed this run only gets fields + comment again
// - fixed lists each issue once, in first-fixed order; skipped = attempted issues never fixed
// - An issue transitioned by a failed apply keeps its `failed` entry; later records only retry fields + comment
// - No fix records => no version lookup or creation
// errors: SyncError (classification, job/range, previous build) and tracker version errors propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::jenkins::BuildServer;
use crate::jira::Tracker;
use crate::model::{BugfixBatch, BuildMarker, ProjectCode, SkippedIssue, SyncReport};
use crate::project;
use crate::range;
use crate::transition::{self, ApplyOutcome, RunTags, Step};
use crate::util;
use crate::version;

#[derive(Debug, Clone)]
pub struct SyncRequest {
  pub job_name: String,
  pub build_number: BuildMarker,
  pub since_build: Option<BuildMarker>,
  pub project: Option<ProjectCode>,
  pub transition: String,
  pub now: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchResult {
  pub fixed: Vec<String>,
  pub skipped: Vec<SkippedIssue>,
}

/// Apply every record in order and fold per-issue outcomes.
pub fn apply_batch(tracker: &dyn Tracker, batch: &BugfixBatch, transition_name: &str) -> BatchResult {
  let tags = RunTags { platform: batch.platform, env: batch.build_env };
  let mut result = BatchResult::default();
  // Issues whose transition went through in an apply that otherwise failed.
  let mut transitioned: Vec<String> = Vec::new();

  for record in &batch.fix_records {
    let issue = record.issue_id.as_str();

    if result.fixed.iter().any(|f| f == issue) {
      let outcome = transition::apply_followup(tracker, record);
      if !outcome.is_fixed() {
        warn!(issue, reason = %outcome.reason(), "follow-up update failed on an already fixed issue");
      }
      continue;
    }

    if transitioned.iter().any(|t| t == issue) {
      let outcome = transition::apply_followup(tracker, record);
      if outcome.is_fixed() {
        transitioned.retain(|t| t != issue);
        result.skipped.retain(|s| s.issue_id != issue);
        result.fixed.push(issue.to_string());
      } else {
        warn!(issue, reason = %outcome.reason(), "follow-up update failed on a partially applied issue");
      }
      continue;
    }

    let outcome = transition::apply(tracker, record, transition_name, tags);
    match &outcome {
      ApplyOutcome::Fixed => {
        result.skipped.retain(|s| s.issue_id != issue);
        result.fixed.push(issue.to_string());
      }
      ApplyOutcome::Ineligible(_) | ApplyOutcome::Failed(_) => {
        if let ApplyOutcome::Failed(f) = &outcome {
          if f.applied.contains(&Step::Transition) {
            transitioned.push(issue.to_string());
          }
        }
        warn!(issue, outcome = outcome.kind(), reason = %outcome.reason(), "issue not fixed");
        let entry = SkippedIssue {
          issue_id: issue.to_string(),
          outcome: outcome.kind().to_string(),
          reason: outcome.reason(),
        };
        match result.skipped.iter_mut().find(|s| s.issue_id == issue) {
          Some(existing) => *existing = entry,
          None => result.skipped.push(entry),
        }
      }
    }
  }

  result
}

pub fn run(server: &dyn BuildServer, tracker: &dyn Tracker, req: &SyncRequest) -> Result<SyncReport> {
  let project = project::resolve(&req.job_name, req.build_number, req.project)?;
  info!(
    job = %req.job_name,
    project = %project.project_code,
    env = ?project.build_env,
    platform = ?project.platform,
    "classified job"
  );

  let previous = range::previous_marker(server, &req.job_name, req.since_build)?;
  let commit_range = range::collect(server, &req.job_name, previous, req.build_number)?;
  info!(
    job = %req.job_name,
    previous,
    build = req.build_number,
    builds = commit_range.builds.len(),
    commits = commit_range.commits.len(),
    "collected change range"
  );

  let batch = aggregate(&commit_range.commits, &project, &commit_range.current);
  info!(version = %batch.version_name, records = batch.fix_records.len(), "aggregated fix records");

  let (version_id, outcome) = if batch.fix_records.is_empty() {
    (None, BatchResult::default())
  } else {
    let id = version::ensure_version(tracker, project.project_code.as_str(), &batch.version_name)?;
    (Some(id), apply_batch(tracker, &batch, &req.transition))
  };
  info!(fixed = outcome.fixed.len(), skipped = outcome.skipped.len(), "reconciliation finished");

  Ok(SyncReport {
    job_name: req.job_name.clone(),
    build_number: req.build_number,
    previous_build: previous,
    build_url: commit_range.current.url.clone(),
    generated_at: util::rfc3339(util::effective_now(req.now)),
    version_name: batch.version_name.clone(),
    version_id,
    commits: batch.commit_ids,
    fix_records: batch.fix_records,
    fixed: outcome.fixed,
    skipped: outcome.skipped,
    project,
  })
}
