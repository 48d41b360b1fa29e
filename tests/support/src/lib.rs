//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust
//! use test_support::{init_tracing, fixtures_dir};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let _root = fixtures_dir();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::{env, path::{Path, PathBuf}};

/// Variables the binary reads for endpoints, settings, and fixture-backed collaborators.
pub const SYNC_ENV_VARS: [&str; 9] = [
    "JENKINS_URL",
    "JENKINS_USER",
    "JENKINS_TOKEN",
    "JIRA_URL",
    "JIRA_USER",
    "JIRA_TOKEN",
    "JJS_CONFIG",
    "JJS_TEST_JENKINS_JSON",
    "JJS_TEST_JIRA_JSON",
];

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Return the path to the repository's `tests/fixtures` directory.
///
/// `tests/support` is the manifest dir of this crate, so the fixtures live one level up.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("tests"))
        .join("fixtures")
}

/// Return the path to the repository's `tests/schemas` directory.
pub fn schemas_dir() -> PathBuf {
    fixtures_dir().with_file_name("schemas")
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
    let path = fixtures_dir().join(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Deserialize a JSON fixture into `T` (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn read_fixture_json<T, P>(rel_path: P) -> T
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = fixtures_dir().join(rel_path);
    let file = std::fs::File::open(&path)
        .unwrap_or_else(|e| panic!("failed to open fixture {}: {e}", path.display()));
    serde_json::from_reader::<_, T>(file)
        .unwrap_or_else(|e| panic!("failed to parse JSON fixture {}: {e}", path.display()))
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
    EnvGuard::set_many(vars)
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// Example:
/// ```
/// use test_support::cmd_bin;
///
/// let mut cmd = cmd_bin("jenkins-jira-sync");
/// cmd.arg("--help").assert().success();
/// ```
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// `jenkins-jira-sync` wired to fixture-backed collaborators.
///
/// Inherited endpoint and settings variables are removed first, so the parent
/// environment cannot leak into the run; `RUST_LOG` is pinned to `warn`.
pub fn sync_cmd(jenkins_fixture: &str, jira_fixture: &str) -> assert_cmd::Command {
    let mut cmd = cmd_bin("jenkins-jira-sync");
    for k in SYNC_ENV_VARS {
        cmd.env_remove(k);
    }
    cmd.env("JJS_TEST_JENKINS_JSON", read_fixture_text(jenkins_fixture))
        .env("JJS_TEST_JIRA_JSON", read_fixture_text(jira_fixture))
        .env("JENKINS_URL", "http://ci.local")
        .env("JIRA_URL", "http://jira.local")
        .env("RUST_LOG", "warn");
    cmd
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
    prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set_many(kv: &[(&str, &str)]) -> Self {
        let mut prev = Vec::with_capacity(kv.len());
        for (k, v) in kv {
            let k_owned = k.to_string();
            prev.push((k_owned.clone(), env::var(k).ok()));
            env::set_var(k, v);
        }
        Self { prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, old) in self.prev.drain(..) {
            match old {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}
