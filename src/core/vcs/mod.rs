//! Version control collaborator
//!
//! The pipeline only talks to git through `VersionControl`; `SystemGit` is
//! the shipped implementation, test code swaps in an in-memory fake.

pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use crate::release::commits::CommitRecord;
use std::path::{Path, PathBuf};

/// Narrow interface to the repository a release is cut from
pub trait VersionControl: Send + Sync {
  /// Name of the checked-out branch (`HEAD` when detached)
  fn current_branch(&self) -> ReleaseResult<String>;

  /// Tags reachable from HEAD
  fn tags(&self) -> ReleaseResult<Vec<String>>;

  /// Commits after `since` (a tag) up to HEAD, oldest first; all of history when `None`
  fn list_commits_since(&self, since: Option<&str>) -> ReleaseResult<Vec<CommitRecord>>;

  /// Commit `files` (root-relative) with `message`, tag the result, return its SHA
  ///
  /// With no files, only the tag is created on the current HEAD.
  fn commit_and_tag(&self, files: &[PathBuf], message: &str, tag: &str) -> ReleaseResult<String>;

  /// Directory holding repository metadata (`.git`)
  fn git_dir(&self) -> ReleaseResult<PathBuf>;

  /// Working tree root
  fn work_tree(&self) -> &Path;
}
