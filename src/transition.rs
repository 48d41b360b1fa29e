// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Decide per issue whether the run may move it to the built state, then transition, set fields and comment
// role: reconciliation/issue-transition
// inputs: Tracker, FixRecord, transition name, run platform/env
// outputs: ApplyOutcome per record (Fixed | Ineligible | Failed); never aborts the batch
// side_effects: Up to three tracker writes per eligible issue (transition, fields, comment)
// invariants:
// - Gates run in order: transition available, platform, environment; a failing gate performs zero writes
// - An issue without any known platform (env) label is never blocked by the platform (env) gate
// - All three writes are attempted even after a failure; nothing is rolled back
// errors: Read and write failures become ApplyOutcome::Failed naming the failed and applied steps
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::jira::{IssueFields, Tracker};
use crate::model::{BuildEnv, ENV_TAGS, FixRecord, PLATFORM_TAGS, Platform};

/// Why an issue was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ineligible {
  #[error("transition `{transition}` is not available")]
  TransitionUnavailable { transition: String },

  #[error("platform labels {labels:?} do not include {run}")]
  PlatformMismatch { run: String, labels: Vec<String> },

  #[error("environment labels {labels:?} do not include {run}")]
  EnvironmentMismatch { run: String, labels: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  ReadTransitions,
  ReadLabels,
  Transition,
  UpdateFields,
  Comment,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Step::ReadTransitions => "read-transitions",
      Step::ReadLabels => "read-labels",
      Step::Transition => "transition",
      Step::UpdateFields => "update-fields",
      Step::Comment => "comment",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyFailure {
  pub failed: Vec<(Step, String)>,
  pub applied: Vec<Step>,
}

impl fmt::Display for ApplyFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let failed: Vec<String> = self.failed.iter().map(|(s, e)| format!("{}: {}", s, e)).collect();
    write!(f, "failed [{}]", failed.join("; "))?;
    if !self.applied.is_empty() {
      let applied: Vec<String> = self.applied.iter().map(Step::to_string).collect();
      write!(f, "; already applied [{}]", applied.join(", "))?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
  Fixed,
  Ineligible(Ineligible),
  Failed(ApplyFailure),
}

impl ApplyOutcome {
  /// True iff the issue was actually modified as a whole.
  pub fn is_fixed(&self) -> bool {
    matches!(self, ApplyOutcome::Fixed)
  }

  pub fn kind(&self) -> &'static str {
    match self {
      ApplyOutcome::Fixed => "fixed",
      ApplyOutcome::Ineligible(_) => "ineligible",
      ApplyOutcome::Failed(_) => "failed",
    }
  }

  pub fn reason(&self) -> String {
    match self {
      ApplyOutcome::Fixed => String::new(),
      ApplyOutcome::Ineligible(r) => r.to_string(),
      ApplyOutcome::Failed(f) => f.to_string(),
    }
  }
}

/// Tags of the current run that issue labels are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTags {
  pub platform: Option<Platform>,
  pub env: BuildEnv,
}

/// Pass unless the issue carries a label from `known` and none of them is `run`.
fn tag_gate(labels: &[String], known: &[&str], run: Option<&str>) -> Result<(), Vec<String>> {
  let tagged: Vec<String> = labels.iter().filter(|l| known.contains(&l.as_str())).cloned().collect();
  if tagged.is_empty() {
    return Ok(());
  }
  match run {
    Some(r) if tagged.iter().any(|t| t == r) => Ok(()),
    _ => Err(tagged),
  }
}

/// Platform then environment gate over an issue's labels.
pub fn check_labels(labels: &[String], tags: RunTags) -> Result<(), Ineligible> {
  let run_platform = tags.platform.map(Platform::tag);
  tag_gate(labels, &PLATFORM_TAGS, run_platform).map_err(|labels| Ineligible::PlatformMismatch {
    run: run_platform.unwrap_or("unclassified").to_string(),
    labels,
  })?;

  let run_env = tags.env.tag();
  tag_gate(labels, &ENV_TAGS, Some(run_env)).map_err(|labels| Ineligible::EnvironmentMismatch {
    run: run_env.to_string(),
    labels,
  })
}

fn fields_of(record: &FixRecord) -> IssueFields {
  IssueFields {
    assignee: record.assignee.clone(),
    fix_version: record.version_name.clone(),
  }
}

fn read_failure(step: Step, err: anyhow::Error) -> ApplyOutcome {
  ApplyOutcome::Failed(ApplyFailure { failed: vec![(step, format!("{:#}", err))], applied: Vec::new() })
}

/// Collects write results; every write is attempted regardless of earlier failures.
#[derive(Default)]
struct Attempts {
  failed: Vec<(Step, String)>,
  applied: Vec<Step>,
}

impl Attempts {
  fn record(&mut self, issue: &str, step: Step, result: anyhow::Result<()>) {
    match result {
      Ok(()) => self.applied.push(step),
      Err(e) => {
        let message = format!("{:#}", e);
        warn!(issue, step = %step, error = %message, "tracker write failed");
        self.failed.push((step, message));
      }
    }
  }

  fn finish(self) -> ApplyOutcome {
    if self.failed.is_empty() {
      ApplyOutcome::Fixed
    } else {
      ApplyOutcome::Failed(ApplyFailure { failed: self.failed, applied: self.applied })
    }
  }
}

/// Gate, then transition the issue and record the fix on it.
pub fn apply(tracker: &dyn Tracker, record: &FixRecord, transition: &str, tags: RunTags) -> ApplyOutcome {
  let issue = record.issue_id.as_str();

  let available = match tracker.available_transitions(issue) {
    Ok(t) => t,
    Err(e) => return read_failure(Step::ReadTransitions, e),
  };
  if !available.iter().any(|t| t == transition) {
    debug!(issue, transition, ?available, "transition not offered");
    return ApplyOutcome::Ineligible(Ineligible::TransitionUnavailable { transition: transition.to_string() });
  }

  let labels = match tracker.issue_labels(issue) {
    Ok(l) => l,
    Err(e) => return read_failure(Step::ReadLabels, e),
  };
  if let Err(reason) = check_labels(&labels, tags) {
    debug!(issue, %reason, "label gate closed");
    return ApplyOutcome::Ineligible(reason);
  }

  let fields = fields_of(record);
  let mut attempts = Attempts::default();
  attempts.record(issue, Step::Transition, tracker.transition(issue, transition));
  attempts.record(issue, Step::UpdateFields, tracker.update_fields(issue, &fields));
  attempts.record(issue, Step::Comment, tracker.add_comment(issue, &record.comment));

  let outcome = attempts.finish();
  if outcome.is_fixed() {
    info!(issue, version = %record.version_name, assignee = %record.assignee, "issue fixed");
  }
  outcome
}

/// Later record for an issue this run already transitioned: refresh fields and add its comment.
pub fn apply_followup(tracker: &dyn Tracker, record: &FixRecord) -> ApplyOutcome {
  let issue = record.issue_id.as_str();
  let fields = fields_of(record);
  let mut attempts = Attempts::default();
  attempts.record(issue, Step::UpdateFields, tracker.update_fields(issue, &fields));
  attempts.record(issue, Step::Comment, tracker.add_comment(issue, &record.comment));
  attempts.finish()
}
