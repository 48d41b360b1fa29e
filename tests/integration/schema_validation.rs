use jsonschema::validator_for;
use test_support::{schemas_dir, sync_cmd};

fn compile_schema(name: &str) -> jsonschema::Validator {
  let data = std::fs::read(schemas_dir().join(name)).expect("schema file");
  let schema: serde_json::Value = serde_json::from_slice(&data).expect("valid schema JSON");
  validator_for(&schema).expect("compile schema")
}

fn report(args: &[&str]) -> serde_json::Value {
  let out = sync_cmd("jenkins_wordcross.json", "jira_wordcross.json").args(args).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn report_conforms_to_schema() {
  let compiled = compile_schema("sync-report.schema.json");
  let v = report(&["WordCross_V1_Beta_iOS", "193"]);
  compiled.validate(&v).expect("schema validation failed for sync report");
}

#[test]
fn report_without_fixes_conforms_to_schema() {
  let compiled = compile_schema("sync-report.schema.json");
  // Build 191 carries no commits: no fix records, no version id.
  let v = report(&["WordCross_V1_Beta_iOS", "191", "--since-build", "190"]);
  assert!(v.get("version_id").is_none());
  compiled.validate(&v).expect("schema validation failed for empty report");
}

#[test]
fn schema_rejects_unknown_outcome() {
  let compiled = compile_schema("sync-report.schema.json");
  let mut v = report(&["WordCross_V1_Beta_iOS", "193"]);
  v["skipped"][0]["outcome"] = serde_json::json!("maybe");
  assert!(!compiled.is_valid(&v));
}
