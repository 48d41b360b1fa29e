#[test]
fn gen_man_outputs_troff() {
  test_support::init_tracing();
  let mut cmd = test_support::cmd_bin("jenkins-jira-sync");
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  // clap_mangen emits a roff manpage with a .TH title line after its quote-string preamble
  assert!(text.contains(".TH"), "expected troff man header");
  assert!(text.contains("jenkins-jira-sync"));
}
