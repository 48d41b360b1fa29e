// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path lookup and typed extraction over serde_json::Value for Jenkins/Jira payloads
// role: extension/serde_json
// outputs: JsonFetch trait (fetch, fetch_any) and JsonFetched wrapper for typed extraction with defaults
// invariants:
// - No panics; missing paths yield None; to_or_default returns T::default on failure
// - Numeric path segments index into arrays ("changeSets.0.items")
// - fetch_any returns the first path that resolves to a non-null value
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Wrapper around a JSON location to allow typed extraction via a clear second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// Borrow the location as an array; missing or non-array yields an empty slice.
  pub fn items(&self) -> &'a [Value] {
    self.inner.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Read a string-ish scalar; numbers are rendered (Jenkins ids may be either).
  pub fn text(&self) -> Option<String> {
    match self.inner? {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }
}

/// Extension to fetch nested values via dotted paths like "author.fullName".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;

  /// First of several candidate paths that holds a non-null value.
  fn fetch_any(&self, paths: &[&str]) -> JsonFetched<'_>;
}

impl JsonFetch for Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      let next = match (cur, key.parse::<usize>()) {
        (Value::Array(arr), Ok(idx)) => arr.get(idx),
        _ => cur.get(key),
      };
      match next {
        Some(v) => cur = v,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }

  fn fetch_any(&self, paths: &[&str]) -> JsonFetched<'_> {
    for path in paths {
      let found = self.fetch(path);
      if matches!(found.inner, Some(v) if !v.is_null()) {
        return found;
      }
    }
    JsonFetched { inner: None }
  }
}
