// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: In-memory BuildServer and Tracker backed by JSON fixtures, for unit tests and env-mock CLI runs
// role: testing/fakes
// inputs: BuildServerFixture ($JJS_TEST_JENKINS_JSON), TrackerFixture ($JJS_TEST_JIRA_JSON)
// outputs: Trait impls answering from fixture state; recorded tracker writes
// side_effects: None outside process memory
// invariants:
// - Build-server fixture shape: {"jobs": {"<job>": {"last_good": 192, "builds": {"193": {<jenkins build document>}}}}}
// - Tracker fixture shape: {"versions": {"WCI": [{"id", "name"}]}, "issues": {"WCI-5": {"labels", "transitions"}}, "fail": {"WCI-9": ["update_fields"]}}
// - Failure injection names the trait op: available_transitions, issue_labels, transition, update_fields, add_comment
// - Created version ids count up from 20001; a transition clears the issue's offered transitions
// errors: Unknown issues and injected failures surface as anyhow errors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cell::RefCell;
use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jenkins::{BuildServer, parse_build_changes};
use crate::jira::{IssueFields, Tracker, TrackerVersion};
use crate::model::{BuildChanges, BuildMarker, VersionId};

// ---------------------------------------------------------------------------
// MemoryBuildServer
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FakeJob {
  #[serde(default)]
  pub last_good: Option<BuildMarker>,
  /// Raw Jenkins build documents keyed by build number.
  #[serde(default)]
  pub builds: BTreeMap<BuildMarker, Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BuildServerFixture {
  #[serde(default)]
  pub jobs: BTreeMap<String, FakeJob>,
}

#[derive(Debug, Default)]
pub struct MemoryBuildServer {
  fixture: BuildServerFixture,
  fetched: RefCell<Vec<BuildMarker>>,
}

impl MemoryBuildServer {
  pub fn new(fixture: BuildServerFixture) -> Self {
    Self { fixture, fetched: RefCell::new(Vec::new()) }
  }

  pub fn from_json_str(raw: &str) -> Result<Self> {
    let fixture: BuildServerFixture = serde_json::from_str(raw).context("parsing build-server fixture JSON")?;
    Ok(Self::new(fixture))
  }

  #[cfg(test)]
  /// Build numbers passed to `get_build`, in call order.
  pub fn fetched(&self) -> Vec<BuildMarker> {
    self.fetched.borrow().clone()
  }
}

impl BuildServer for MemoryBuildServer {
  fn list_builds(&self, job: &str) -> Result<Option<Vec<BuildMarker>>> {
    Ok(self.fixture.jobs.get(job).map(|j| j.builds.keys().copied().collect()))
  }

  fn get_build(&self, job: &str, number: BuildMarker) -> Result<Option<BuildChanges>> {
    self.fetched.borrow_mut().push(number);
    Ok(
      self
        .fixture
        .jobs
        .get(job)
        .and_then(|j| j.builds.get(&number))
        .map(|doc| parse_build_changes(doc, number)),
    )
  }

  fn last_good_build(&self, job: &str) -> Result<Option<BuildMarker>> {
    Ok(self.fixture.jobs.get(job).and_then(|j| j.last_good))
  }
}

// ---------------------------------------------------------------------------
// MemoryTracker
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakeIssue {
  #[serde(default)]
  pub labels: Vec<String>,
  #[serde(default)]
  pub transitions: Vec<String>,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub assignee: Option<String>,
  #[serde(default)]
  pub fix_versions: Vec<String>,
  #[serde(default)]
  pub comments: Vec<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TrackerFixture {
  #[serde(default)]
  pub versions: BTreeMap<String, Vec<TrackerVersion>>,
  #[serde(default)]
  pub issues: BTreeMap<String, FakeIssue>,
  /// Operation names (e.g. "transition", "update_fields") that fail for an issue.
  #[serde(default)]
  pub fail: BTreeMap<String, Vec<String>>,
}

/// One tracker write, recorded in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerWrite {
  CreateVersion { project: String, name: String },
  Transition { issue: String, name: String },
  UpdateFields { issue: String, fields: IssueFields },
  Comment { issue: String, body: String },
}

#[derive(Debug, Default)]
pub struct MemoryTracker {
  state: RefCell<TrackerFixture>,
  writes: RefCell<Vec<TrackerWrite>>,
  next_version_id: RefCell<u64>,
}

impl MemoryTracker {
  pub fn new(fixture: TrackerFixture) -> Self {
    Self {
      state: RefCell::new(fixture),
      writes: RefCell::new(Vec::new()),
      next_version_id: RefCell::new(20_000),
    }
  }

  pub fn from_json_str(raw: &str) -> Result<Self> {
    let fixture: TrackerFixture = serde_json::from_str(raw).context("parsing tracker fixture JSON")?;
    Ok(Self::new(fixture))
  }

  #[cfg(test)]
  pub fn writes(&self) -> Vec<TrackerWrite> {
    self.writes.borrow().clone()
  }

  #[cfg(test)]
  pub fn issue(&self, id: &str) -> Option<FakeIssue> {
    self.state.borrow().issues.get(id).cloned()
  }

  pub fn versions(&self, project: &str) -> Vec<TrackerVersion> {
    self.state.borrow().versions.get(project).cloned().unwrap_or_default()
  }

  fn check_fail(&self, issue: &str, op: &str) -> Result<()> {
    let state = self.state.borrow();
    if state.fail.get(issue).is_some_and(|ops| ops.iter().any(|o| o == op)) {
      bail!("{} on {} rejected by tracker", op, issue);
    }
    Ok(())
  }

  fn with_issue<T>(&self, id: &str, f: impl FnOnce(&mut FakeIssue) -> T) -> Result<T> {
    let mut state = self.state.borrow_mut();
    match state.issues.get_mut(id) {
      Some(issue) => Ok(f(issue)),
      None => bail!("issue {} does not exist", id),
    }
  }
}

impl Tracker for MemoryTracker {
  fn list_versions(&self, project: &str) -> Result<Vec<TrackerVersion>> {
    Ok(self.versions(project))
  }

  fn create_version(&self, project: &str, name: &str, _description: &str, _released: bool) -> Result<VersionId> {
    let id = {
      let mut next = self.next_version_id.borrow_mut();
      *next += 1;
      VersionId(next.to_string())
    };
    self
      .state
      .borrow_mut()
      .versions
      .entry(project.to_string())
      .or_default()
      .push(TrackerVersion { id: id.clone(), name: name.to_string() });
    self.writes.borrow_mut().push(TrackerWrite::CreateVersion {
      project: project.to_string(),
      name: name.to_string(),
    });
    Ok(id)
  }

  fn available_transitions(&self, issue: &str) -> Result<Vec<String>> {
    self.check_fail(issue, "available_transitions")?;
    self.with_issue(issue, |i| i.transitions.clone())
  }

  fn issue_labels(&self, issue: &str) -> Result<Vec<String>> {
    self.check_fail(issue, "issue_labels")?;
    self.with_issue(issue, |i| i.labels.clone())
  }

  fn transition(&self, issue: &str, name: &str) -> Result<()> {
    self.check_fail(issue, "transition")?;
    let available = self.with_issue(issue, |i| i.transitions.iter().any(|t| t == name))?;
    if !available {
      bail!("transition `{}` not available on {}", name, issue);
    }
    self.with_issue(issue, |i| {
      i.status = Some(name.to_string());
      i.transitions.clear();
    })?;
    self.writes.borrow_mut().push(TrackerWrite::Transition {
      issue: issue.to_string(),
      name: name.to_string(),
    });
    Ok(())
  }

  fn update_fields(&self, issue: &str, fields: &IssueFields) -> Result<()> {
    self.check_fail(issue, "update_fields")?;
    self.with_issue(issue, |i| {
      i.assignee = Some(fields.assignee.clone());
      i.fix_versions = vec![fields.fix_version.clone()];
    })?;
    self.writes.borrow_mut().push(TrackerWrite::UpdateFields {
      issue: issue.to_string(),
      fields: fields.clone(),
    });
    Ok(())
  }

  fn add_comment(&self, issue: &str, body: &str) -> Result<()> {
    self.check_fail(issue, "add_comment")?;
    self.with_issue(issue, |i| i.comments.push(body.to_string()))?;
    self.writes.borrow_mut().push(TrackerWrite::Comment {
      issue: issue.to_string(),
      body: body.to_string(),
    });
    Ok(())
  }
}
