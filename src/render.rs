// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Write the SyncReport as pretty JSON to stdout or a file
// role: persistence/report
// inputs: SyncReport, --out value ("-" or a file path)
// outputs: Pretty JSON on stdout, or a file whose parent directories are created
// side_effects: Writes to stdout or the filesystem
// invariants:
// - "-" always means stdout; any other value is a file path, never a directory
// - Output is a single JSON document with a trailing newline
// errors: Serialization and IO errors surfaced with the target path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::model::SyncReport;

pub fn report_bytes(report: &SyncReport) -> Result<Vec<u8>> {
  let mut bytes = serde_json::to_vec_pretty(report).context("serializing sync report")?;
  bytes.push(b'\n');
  Ok(bytes)
}

pub fn write_report(report: &SyncReport, out: &str) -> Result<()> {
  let bytes = report_bytes(report)?;

  if out == "-" {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(&bytes).context("writing report to stdout")?;
    lock.flush()?;
    return Ok(());
  }

  let out_path = Path::new(out);
  if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(out_path, &bytes).with_context(|| format!("writing report to {}", out_path.display()))?;
  info!(path = %out_path.display(), "wrote report");
  Ok(())
}
