// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Find issue identifiers (PREFIX-NUMBER) for one project in free-text commit messages
// role: parsing/identifiers
// inputs: message text, project code
// outputs: Matched substrings in left-to-right order, duplicates kept, original case kept
// invariants:
// - Number part starts with 1-9; "WCI-007" yields nothing
// - Matching is case-insensitive; canonical upper-casing is the caller's job
// - Empty text, no match, or an uncompilable pattern yields an empty Vec, never an error or panic
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

type PatternCache = Mutex<HashMap<String, Regex>>;

fn pattern_for(project_code: &str) -> Option<Regex> {
  static CACHE: Lazy<PatternCache> = Lazy::new(|| Mutex::new(HashMap::new()));

  if let Some(re) = CACHE.lock().ok().and_then(|m| m.get(project_code).cloned()) {
    return Some(re);
  }

  let re = Regex::new(&format!("(?i){}-[1-9][0-9]*", regex::escape(project_code))).ok()?;

  if let Ok(mut map) = CACHE.lock() {
    map.insert(project_code.to_string(), re.clone());
  }

  Some(re)
}

/// Return every `project_code-N` occurrence in `text`, as written.
pub fn extract(text: &str, project_code: &str) -> Vec<String> {
  if text.is_empty() || project_code.is_empty() {
    return Vec::new();
  }

  match pattern_for(project_code) {
    Some(re) => re.find_iter(text).map(|m| m.as_str().to_string()).collect(),
    None => Vec::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn finds_mixed_case_ids_and_skips_leading_zero() {
    let got = extract("Fixed WCI-12 and wci-7 and WCI-007", "WCI");
    assert_eq!(got, vec!["WCI-12", "wci-7"]);
    let canonical: Vec<String> = got.iter().map(|s| s.to_uppercase()).collect();
    assert_eq!(canonical, vec!["WCI-12", "WCI-7"]);
  }

  #[test]
  fn keeps_duplicates_in_order() {
    assert_eq!(extract("TP-3 TP-1 tp-3", "TP"), vec!["TP-3", "TP-1", "tp-3"]);
  }

  #[test]
  fn empty_inputs_yield_nothing() {
    assert!(extract("", "WCI").is_empty());
    assert!(extract("nothing to see", "WCI").is_empty());
    assert!(extract("WGD-4 only", "WCI").is_empty());
  }

  #[test]
  fn regex_metacharacters_in_code_match_literally() {
    assert_eq!(extract("see A.B-4 and AxB-5", "A.B"), vec!["A.B-4"]);
    assert!(extract("C+-1", "C+(").is_empty());
    assert!(pattern_for("A.B").is_some());
    assert!(pattern_for("A.B").is_some_and(|re| re.is_match("a.b-9")));
  }

  #[test]
  fn trailing_digits_after_zero_are_part_of_the_number() {
    assert_eq!(extract("PDM-10 PDM-0", "PDM"), vec!["PDM-10"]);
  }

  proptest! {
    #[test]
    fn every_match_is_prefixed_and_nonzero(text in ".{0,64}") {
      let re = Regex::new("^(?i)WCI-[1-9][0-9]*$").unwrap();
      for id in extract(&text, "WCI") {
        prop_assert!(re.is_match(&id), "unexpected match {}", id);
      }
    }

    #[test]
    fn matches_appear_in_source_order(nums in proptest::collection::vec(1u32..100_000, 0..8)) {
      let text = nums.iter().map(|n| format!("TP-{} ", n)).collect::<String>();
      let expected: Vec<String> = nums.iter().map(|n| format!("TP-{}", n)).collect();
      prop_assert_eq!(extract(&text, "TP"), expected);
    }
  }
}
