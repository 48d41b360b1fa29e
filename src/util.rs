// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Shared helpers: blocking JSON-over-HTTP calls, basic auth, URL segments, "now" override, man page rendering
// role: utilities/helpers
// inputs: URLs, credentials, optional JSON bodies; clap CommandFactory
// outputs: Parsed JSON values (None on 404), RFC3339 timestamps, man page text
// side_effects: Network calls through ureq
// invariants:
// - get_json maps HTTP 404 to Ok(None); every other non-2xx is an error naming method and URL
// - send_json tolerates empty response bodies (204) and returns Value::Null for them
// - encode_segment leaves RFC 3986 unreserved bytes untouched
// errors: Transport and status errors surface with method + URL context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use clap::CommandFactory;
use serde_json::Value;
use tracing::debug;

/// Build the agent every collaborator client shares.
pub fn http_agent() -> ureq::Agent {
  ureq::AgentBuilder::new()
    .timeout_connect(Duration::from_secs(10))
    .timeout(Duration::from_secs(60))
    .user_agent(concat!("jenkins-jira-sync/", env!("CARGO_PKG_VERSION")))
    .build()
}

/// `Authorization` header value for HTTP basic auth; None when no principal is set.
pub fn basic_auth(principal: &str, secret: &str) -> Option<String> {
  if principal.is_empty() {
    return None;
  }
  Some(format!("Basic {}", STANDARD.encode(format!("{}:{}", principal, secret))))
}

/// Percent-encode one URL path segment.
pub fn encode_segment(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for b in raw.bytes() {
    if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
      out.push(b as char);
    } else {
      out.push_str(&format!("%{:02X}", b));
    }
  }
  out
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
  format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// GET a JSON document; Ok(None) when the server answers 404.
pub fn get_json(agent: &ureq::Agent, url: &str, auth: Option<&str>) -> Result<Option<Value>> {
  debug!(url, "GET");
  let mut req = agent.get(url).set("Accept", "application/json");
  if let Some(a) = auth {
    req = req.set("Authorization", a);
  }

  match req.call() {
    Ok(resp) => {
      let v = resp.into_json::<Value>().with_context(|| format!("decoding JSON from GET {}", url))?;
      Ok(Some(v))
    }
    Err(ureq::Error::Status(404, _)) => Ok(None),
    Err(e) => Err(anyhow::Error::new(e).context(format!("GET {}", url))),
  }
}

/// Send a JSON body with `method`; returns the decoded response or Null for an empty body.
pub fn send_json(agent: &ureq::Agent, method: &str, url: &str, auth: Option<&str>, body: &Value) -> Result<Value> {
  debug!(method, url, "send");
  let mut req = agent
    .request(method, url)
    .set("Accept", "application/json")
    .set("Content-Type", "application/json");
  if let Some(a) = auth {
    req = req.set("Authorization", a);
  }

  let resp = req
    .send_json(body)
    .map_err(|e| anyhow::Error::new(e).context(format!("{} {}", method, url)))?;
  let text = resp
    .into_string()
    .with_context(|| format!("reading response of {} {}", method, url))?;

  if text.trim().is_empty() {
    return Ok(Value::Null);
  }
  serde_json::from_str(&text).with_context(|| format!("decoding JSON from {} {}", method, url))
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current local time is used. Keeps report timestamps deterministic
/// under test without sprinkling `Local::now()` throughout the code.
pub fn effective_now(override_now: Option<DateTime<FixedOffset>>) -> DateTime<FixedOffset> {
  override_now.unwrap_or_else(|| Local::now().fixed_offset())
}

/// Parse the hidden `--now-override` value (RFC3339).
pub fn parse_now(raw: Option<&str>) -> Result<Option<DateTime<FixedOffset>>> {
  raw
    .map(|s| DateTime::parse_from_rfc3339(s).with_context(|| format!("invalid --now-override `{}`", s)))
    .transpose()
}

pub fn rfc3339(dt: DateTime<FixedOffset>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
