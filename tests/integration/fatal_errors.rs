use predicates::prelude::*;
use test_support::sync_cmd;

const JENKINS: &str = "jenkins_wordcross.json";
const JIRA: &str = "jira_wordcross.json";

#[test]
fn unclassifiable_job_fails_and_names_it() {
  sync_cmd(JENKINS, JIRA)
    .args(["UnknownJob_Beta", "1"])
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("UnknownJob_Beta"));
}

#[test]
fn unknown_job_is_not_found() {
  sync_cmd(JENKINS, JIRA)
    .args(["TestProject_Alpha_Web", "5"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown to the build server"));
}

#[test]
fn missing_build_is_not_found() {
  sync_cmd(JENKINS, JIRA)
    .args(["WordCross_V1_Beta_iOS", "999"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("#999"));
}

#[test]
fn build_number_must_be_positive_integer() {
  sync_cmd(JENKINS, JIRA)
    .args(["WordCross_V1_Beta_iOS", "abc"])
    .assert()
    .code(2);
  sync_cmd(JENKINS, JIRA)
    .args(["WordCross_V1_Beta_iOS", "0"])
    .assert()
    .code(2);
}

#[test]
fn since_build_not_below_target_is_rejected() {
  sync_cmd(JENKINS, JIRA)
    .args(["WordCross_V1_Beta_iOS", "193", "--since-build", "193"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--since-build"));
}

#[test]
fn missing_tracker_url_is_reported() {
  sync_cmd(JENKINS, JIRA)
    .env_remove("JIRA_URL")
    .args(["WordCross_V1_Beta_iOS", "193"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("jira.url"));
}

#[test]
fn broken_fixture_json_is_an_error() {
  sync_cmd(JENKINS, JIRA)
    .env("JJS_TEST_JIRA_JSON", "{ not json")
    .args(["WordCross_V1_Beta_iOS", "193"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("tracker fixture"));
}
