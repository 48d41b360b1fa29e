// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn the commit range into per-(commit, issue) fix records plus the list of commit ids seen
// role: processing/fix-aggregation
// inputs: commits in range order, project code, version name, current build info
// outputs: BugfixBatch (fix records, commit ids, version name, env/platform)
// invariants:
// - One FixRecord per identifier match; no dedup across or within commits
// - Record order = commit order, then match order within the message
// - issue_id is upper-cased; assignee is the commit author verbatim
// - Every commit id appears in commit_ids, with or without issue references
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::extract::extract;
use crate::model::{BugfixBatch, BuildInfo, Commit, FixRecord, ProjectInfo};

/// Audit comment left on every fixed issue.
pub fn compose_comment(commit: &Commit, build: &BuildInfo) -> String {
  format!(
    "FixBy: {}\nCommitId: {}\nComment: {}\nFixVersion: {}\nBuildUrl: {}",
    commit.author, commit.id, commit.message, build.number, build.url
  )
}

pub fn aggregate(commits: &[Commit], project: &ProjectInfo, build: &BuildInfo) -> BugfixBatch {
  let version_name = project.version_name();
  let code = project.project_code.as_str();

  let mut fix_records: Vec<FixRecord> = Vec::new();
  let mut commit_ids: Vec<String> = Vec::with_capacity(commits.len());

  for commit in commits {
    commit_ids.push(commit.id.clone());

    let ids = extract(&commit.message, code);
    if ids.is_empty() {
      continue;
    }

    let comment = compose_comment(commit, build);
    fix_records.extend(ids.into_iter().map(|id| FixRecord {
      issue_id: id.to_uppercase(),
      comment: comment.clone(),
      assignee: commit.author.clone(),
      version_name: version_name.clone(),
    }));
  }

  BugfixBatch {
    fix_records,
    project_code: project.project_code,
    commit_ids,
    build_env: project.build_env,
    platform: project.platform,
    version_name,
  }
}
