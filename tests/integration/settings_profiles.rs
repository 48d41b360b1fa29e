use predicates::prelude::*;
use test_support::{fixtures_dir, sync_cmd};

const JENKINS: &str = "jenkins_wordcross.json";
const JIRA: &str = "jira_wordcross.json";

fn settings_path() -> String {
  fixtures_dir().join("settings.json").to_string_lossy().to_string()
}

#[test]
fn config_file_supplies_endpoints() {
  sync_cmd(JENKINS, JIRA)
    .env_remove("JENKINS_URL")
    .env_remove("JIRA_URL")
    .args(["WordCross_V1_Beta_iOS", "193", "--config", &settings_path(), "--profile", "legacy"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"version_name\": \"Beta#193\""));
}

#[test]
fn config_path_from_env() {
  sync_cmd(JENKINS, JIRA)
    .env_remove("JENKINS_URL")
    .env_remove("JIRA_URL")
    .env("JJS_CONFIG", settings_path())
    .args(["WordCross_V1_Beta_iOS", "193"])
    .assert()
    .success();
}

#[test]
fn unknown_profile_fails() {
  sync_cmd(JENKINS, JIRA)
    .args(["WordCross_V1_Beta_iOS", "193", "--config", &settings_path(), "--profile", "staging"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("staging"));
}

#[test]
fn secrets_stay_out_of_debug_logs() {
  sync_cmd(JENKINS, JIRA)
    .env_remove("RUST_LOG")
    .args(["WordCross_V1_Beta_iOS", "193", "--config", &settings_path(), "--verbose"])
    .assert()
    .success()
    .stderr(predicate::str::contains("using profile"))
    .stderr(predicate::str::contains("jira-token").not());
}
