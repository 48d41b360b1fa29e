// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build-server collaborator: list builds, fetch a build's URL and changeset, resolve last good build
// role: collaborator/jenkins
// inputs: Jenkins endpoint (url, user, API token); env JJS_TEST_JENKINS_JSON selects the in-memory fake
// outputs: BuildMarker lists, BuildChanges, optional last-good marker
// side_effects: Network calls to the Jenkins JSON API
// invariants:
// - Unknown job or build is Ok(None), never an Err; callers decide whether that is fatal
// - Commits keep the order of the changeset payload; freestyle changeSet and pipeline changeSets are both read
// - Folder jobs "a/b" address /job/a/job/b
// errors: Transport/decoding failures propagate with URL context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use serde_json::Value;

use crate::config::Endpoint;
use crate::ext::serde_json::JsonFetch;
use crate::fakes::MemoryBuildServer;
use crate::model::{BuildChanges, BuildInfo, BuildMarker, Commit};
use crate::util::{basic_auth, encode_segment, get_json, http_agent, join_url};

// --- Trait seam for the build server ---
pub trait BuildServer {
  /// Every build number the server knows for `job`; None when the job does not exist.
  fn list_builds(&self, job: &str) -> Result<Option<Vec<BuildMarker>>>;
  /// URL and commits of one build; None when the build does not exist.
  fn get_build(&self, job: &str, number: BuildMarker) -> Result<Option<BuildChanges>>;
  /// Last successful build of `job`, if any.
  fn last_good_build(&self, job: &str) -> Result<Option<BuildMarker>>;
}

/// `job/<a>/job/<b>` for a (possibly foldered) job name.
pub fn job_path(job: &str) -> String {
  job
    .split('/')
    .filter(|s| !s.is_empty())
    .map(|s| format!("job/{}", encode_segment(s)))
    .collect::<Vec<_>>()
    .join("/")
}

/// Query path listing every build number of a job. `builds` is capped at 100 entries, `allBuilds` is not.
pub fn builds_query(job: &str) -> String {
  format!("{}/api/json?tree=allBuilds[number]", job_path(job))
}

/// Read `{"allBuilds":[{"number":N},...]}` (or the capped `builds`), sorted ascending.
pub fn parse_build_list(v: &Value) -> Vec<BuildMarker> {
  let mut out: Vec<BuildMarker> = v
    .fetch_any(&["allBuilds", "builds"])
    .items()
    .iter()
    .filter_map(|b| b.fetch("number").to::<BuildMarker>())
    .collect();
  out.sort_unstable();
  out.dedup();
  out
}

fn parse_commit(item: &Value) -> Option<Commit> {
  let id = item.fetch_any(&["commitId", "id"]).text()?;
  Some(Commit {
    id,
    author: item.fetch_any(&["author.fullName", "authorEmail"]).to_or_default::<String>(),
    message: item.fetch_any(&["comment", "msg"]).to_or_default::<String>(),
  })
}

/// Read a build document into its URL and commit list.
pub fn parse_build_changes(v: &Value, number: BuildMarker) -> BuildChanges {
  let mut commits: Vec<Commit> = v.fetch("changeSet.items").items().iter().filter_map(parse_commit).collect();

  for set in v.fetch("changeSets").items() {
    commits.extend(set.fetch("items").items().iter().filter_map(parse_commit));
  }

  BuildChanges {
    info: BuildInfo {
      number: v.fetch("number").to::<BuildMarker>().unwrap_or(number),
      url: v.fetch("url").to_or_default::<String>(),
    },
    commits,
  }
}

pub struct JenkinsHttpApi {
  base_url: String,
  auth: Option<String>,
  agent: ureq::Agent,
}

impl JenkinsHttpApi {
  pub fn new(endpoint: &Endpoint) -> Self {
    Self {
      base_url: endpoint.url.clone(),
      auth: basic_auth(&endpoint.principal, &endpoint.secret),
      agent: http_agent(),
    }
  }

  fn get(&self, path: &str) -> Result<Option<Value>> {
    get_json(&self.agent, &join_url(&self.base_url, path), self.auth.as_deref())
  }
}

impl BuildServer for JenkinsHttpApi {
  fn list_builds(&self, job: &str) -> Result<Option<Vec<BuildMarker>>> {
    Ok(self.get(&builds_query(job))?.map(|v| parse_build_list(&v)))
  }

  fn get_build(&self, job: &str, number: BuildMarker) -> Result<Option<BuildChanges>> {
    let path = format!("{}/{}/api/json", job_path(job), number);
    Ok(self.get(&path)?.map(|v| parse_build_changes(&v, number)))
  }

  fn last_good_build(&self, job: &str) -> Result<Option<BuildMarker>> {
    let path = format!("{}/lastSuccessfulBuild/api/json?tree=number", job_path(job));
    Ok(self.get(&path)?.and_then(|v| v.fetch("number").to::<BuildMarker>()))
  }
}

fn env_wants_mock() -> bool {
  std::env::var("JJS_TEST_JENKINS_JSON").is_ok()
}

/// Pick the HTTP client, or the fixture-backed fake when `JJS_TEST_JENKINS_JSON` is set.
pub fn build_server(endpoint: &Endpoint) -> Result<Box<dyn BuildServer>> {
  if env_wants_mock() {
    let raw = std::env::var("JJS_TEST_JENKINS_JSON").unwrap_or_default();
    return Ok(Box::new(MemoryBuildServer::from_json_str(&raw)?));
  }
  Ok(Box::new(JenkinsHttpApi::new(endpoint)))
}
