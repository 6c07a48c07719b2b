//! Release operations for SystemGit (history walking, commit-back, tagging)

use super::VersionControl;
use super::system_git::SystemGit;
use crate::core::error::ReleaseResult;
use crate::release::commits::CommitRecord;
use std::path::{Path, PathBuf};

/// Field separator inside one log record
const FIELD_SEP: char = '\x1f';
/// Record separator between commits
const RECORD_SEP: char = '\x1e';

impl VersionControl for SystemGit {
  fn current_branch(&self) -> ReleaseResult<String> {
    let output = self.git_cmd().args(["rev-parse", "--abbrev-ref", "HEAD"]).output()?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Unborn or detached HEAD
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  fn tags(&self) -> ReleaseResult<Vec<String>> {
    let output = self.run(&["tag", "--merged", "HEAD"])?;

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect(),
    )
  }

  fn list_commits_since(&self, since: Option<&str>) -> ReleaseResult<Vec<CommitRecord>> {
    let range = match since {
      Some(tag) => format!("{}..HEAD", tag),
      None => "HEAD".to_string(),
    };
    let format = format!("--format=%H{}%B{}", FIELD_SEP, RECORD_SEP);

    let output = self.run(&["log", "--no-merges", "--reverse", &format, &range])?;
    Ok(parse_log_output(&String::from_utf8_lossy(&output.stdout)))
  }

  fn commit_and_tag(&self, files: &[PathBuf], message: &str, tag: &str) -> ReleaseResult<String> {
    if !files.is_empty() {
      let mut add = vec!["add".to_string(), "--".to_string()];
      add.extend(files.iter().map(|f| path_to_git_format(f)));
      let add: Vec<&str> = add.iter().map(String::as_str).collect();
      self.run(&add)?;

      self.run(&["commit", "--no-verify", "-m", message])?;
    }

    let tag_message = format!("Release {}", tag);
    self.run(&["tag", "-a", tag, "-m", &tag_message])?;

    self.head_commit()
  }

  fn git_dir(&self) -> ReleaseResult<PathBuf> {
    let output = self.run(&["rev-parse", "--absolute-git-dir"])?;
    Ok(PathBuf::from(String::from_utf8_lossy(&output.stdout).trim()))
  }

  fn work_tree(&self) -> &Path {
    &self.work_tree
  }
}

/// Convert a path to git's forward-slash format
fn path_to_git_format(path: &Path) -> String {
  path
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

/// Parse `%H<US>%B<RS>` records into commit records
fn parse_log_output(output: &str) -> Vec<CommitRecord> {
  output
    .split(RECORD_SEP)
    .filter_map(|record| {
      let record = record.trim_start_matches(['\n', '\r']);
      let (sha, body) = record.split_once(FIELD_SEP)?;
      let sha = sha.trim();
      if sha.is_empty() {
        return None;
      }
      Some(CommitRecord::from_message(sha, body.trim()))
    })
    .collect()
}
