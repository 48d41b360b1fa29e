// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Issue-tracker collaborator: versions, issue labels, transitions, field updates and comments
// role: collaborator/jira
// inputs: Jira endpoint (url, user, token); env JJS_TEST_JIRA_JSON selects the in-memory fake
// outputs: Version lists/ids, label sets, transition names; write acknowledgements
// side_effects: Network calls to Jira REST v2 (reads and writes)
// invariants:
// - Every write is a single request; no call retries or batches
// - transition() resolves the transition id by name from the issue's current transitions
// errors: Transport/status errors propagate with method + URL context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::Endpoint;
use crate::ext::serde_json::JsonFetch;
use crate::fakes::MemoryTracker;
use crate::model::VersionId;
use crate::util::{basic_auth, get_json, http_agent, join_url, send_json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerVersion {
  pub id: VersionId,
  pub name: String,
}

/// Fields written on a fixed issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFields {
  pub assignee: String,
  pub fix_version: String,
}

impl IssueFields {
  pub fn to_update_body(&self) -> Value {
    json!({
      "fields": {
        "assignee": { "name": self.assignee },
        "fixVersions": [ { "name": self.fix_version } ]
      }
    })
  }
}

// --- Trait seam for the issue tracker ---
pub trait Tracker {
  fn list_versions(&self, project: &str) -> Result<Vec<TrackerVersion>>;
  fn create_version(&self, project: &str, name: &str, description: &str, released: bool) -> Result<VersionId>;
  /// Names of the transitions currently available on `issue`.
  fn available_transitions(&self, issue: &str) -> Result<Vec<String>>;
  fn issue_labels(&self, issue: &str) -> Result<Vec<String>>;
  fn transition(&self, issue: &str, name: &str) -> Result<()>;
  fn update_fields(&self, issue: &str, fields: &IssueFields) -> Result<()>;
  fn add_comment(&self, issue: &str, body: &str) -> Result<()>;
}

pub struct JiraHttpApi {
  base_url: String,
  auth: Option<String>,
  agent: ureq::Agent,
}

impl JiraHttpApi {
  pub fn new(endpoint: &Endpoint) -> Self {
    Self {
      base_url: endpoint.url.clone(),
      auth: basic_auth(&endpoint.principal, &endpoint.secret),
      agent: http_agent(),
    }
  }

  fn url(&self, path: &str) -> String {
    join_url(&self.base_url, &format!("rest/api/2/{}", path))
  }

  fn get_required(&self, path: &str) -> Result<Value> {
    let url = self.url(path);
    match get_json(&self.agent, &url, self.auth.as_deref())? {
      Some(v) => Ok(v),
      None => bail!("GET {}: not found", url),
    }
  }

  fn send(&self, method: &str, path: &str, body: &Value) -> Result<Value> {
    send_json(&self.agent, method, &self.url(path), self.auth.as_deref(), body)
  }

  fn transitions_json(&self, issue: &str) -> Result<Vec<(String, String)>> {
    let v = self.get_required(&format!("issue/{}/transitions", issue))?;
    Ok(
      v.fetch("transitions")
        .items()
        .iter()
        .filter_map(|t| Some((t.fetch("id").text()?, t.fetch("name").to::<String>()?)))
        .collect(),
    )
  }
}

impl Tracker for JiraHttpApi {
  fn list_versions(&self, project: &str) -> Result<Vec<TrackerVersion>> {
    let v = self.get_required(&format!("project/{}/versions", project))?;
    Ok(
      v.fetch("").items()
        .iter()
        .filter_map(|ver| {
          Some(TrackerVersion {
            id: VersionId(ver.fetch("id").text()?),
            name: ver.fetch("name").to::<String>()?,
          })
        })
        .collect(),
    )
  }

  fn create_version(&self, project: &str, name: &str, description: &str, released: bool) -> Result<VersionId> {
    let body = json!({
      "name": name,
      "project": project,
      "description": description,
      "released": released,
    });
    let v = self.send("POST", "version", &body)?;
    v.fetch("id")
      .text()
      .map(VersionId)
      .with_context(|| format!("created version `{}` in {} but response has no id", name, project))
  }

  fn available_transitions(&self, issue: &str) -> Result<Vec<String>> {
    Ok(self.transitions_json(issue)?.into_iter().map(|(_, name)| name).collect())
  }

  fn issue_labels(&self, issue: &str) -> Result<Vec<String>> {
    let v = self.get_required(&format!("issue/{}?fields=labels", issue))?;
    Ok(v.fetch("fields.labels").to_or_default::<Vec<String>>())
  }

  fn transition(&self, issue: &str, name: &str) -> Result<()> {
    let id = self
      .transitions_json(issue)?
      .into_iter()
      .find(|(_, n)| n == name)
      .map(|(id, _)| id)
      .with_context(|| format!("transition `{}` not available on {}", name, issue))?;
    self.send("POST", &format!("issue/{}/transitions", issue), &json!({ "transition": { "id": id } }))?;
    Ok(())
  }

  fn update_fields(&self, issue: &str, fields: &IssueFields) -> Result<()> {
    self.send("PUT", &format!("issue/{}", issue), &fields.to_update_body())?;
    Ok(())
  }

  fn add_comment(&self, issue: &str, body: &str) -> Result<()> {
    self.send("POST", &format!("issue/{}/comment", issue), &json!({ "body": body }))?;
    Ok(())
  }
}

fn env_wants_mock() -> bool {
  std::env::var("JJS_TEST_JIRA_JSON").is_ok()
}

/// Pick the HTTP client, or the fixture-backed fake when `JJS_TEST_JIRA_JSON` is set.
pub fn build_tracker(endpoint: &Endpoint) -> Result<Box<dyn Tracker>> {
  if env_wants_mock() {
    let raw = std::env::var("JJS_TEST_JIRA_JSON").unwrap_or_default();
    return Ok(Box::new(MemoryTracker::from_json_str(&raw)?));
  }
  Ok(Box::new(JiraHttpApi::new(endpoint)))
}
