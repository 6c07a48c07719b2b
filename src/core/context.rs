//! Release context store - one per run, threaded through every step
//!
//! # Design
//!
//! The orchestrator owns the `ReleaseContext` for the duration of a single
//! pipeline execution and lends it to each plugin as `&mut` for one call.
//!
//! # Invariants
//!
//! - `release_type`, `next_version`, `tag` and the last-release anchor are
//!   write-once: a second write returns `ContextError::AlreadySet`.
//! - `commits`, `assets` and `releases` are append-only. No accessor removes
//!   or reorders entries.
//! - `timestamp` is fixed when the context is created and is the only clock
//!   input of a run.

use crate::core::error::{ContextError, ReleaseResult};
use crate::pipeline::step::Step;
use crate::release::assets::AssetRef;
use crate::release::commits::CommitRecord;
use crate::release::hosting::ReleaseHandle;
use crate::release::version::ReleaseType;
use chrono::{DateTime, Utc};
use semver::Version;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One executed (step, plugin) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
  pub step: Step,
  pub plugin: String,
}

/// Evolving release state for one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseContext {
  branch: String,
  channel: Option<String>,
  timestamp: DateTime<Utc>,
  last_version: Option<Version>,
  last_tag: Option<String>,
  commits: Vec<CommitRecord>,
  release_type: Option<ReleaseType>,
  next_version: Option<Version>,
  tag: Option<String>,
  notes: Option<String>,
  changed_files: BTreeSet<PathBuf>,
  assets: Vec<AssetRef>,
  releases: Vec<ReleaseHandle>,
  history: Vec<StepRecord>,
  warnings: Vec<String>,
  errors: Vec<String>,
  #[serde(skip)]
  anchored: bool,
}

impl ReleaseContext {
  /// Create a fresh context for a run on `branch`
  pub fn new(branch: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
    Self {
      branch: branch.into(),
      channel: None,
      timestamp,
      last_version: None,
      last_tag: None,
      commits: Vec::new(),
      release_type: None,
      next_version: None,
      tag: None,
      notes: None,
      changed_files: BTreeSet::new(),
      assets: Vec::new(),
      releases: Vec::new(),
      history: Vec::new(),
      warnings: Vec::new(),
      errors: Vec::new(),
      anchored: false,
    }
  }

  pub fn branch(&self) -> &str {
    &self.branch
  }

  /// Prerelease identifier of the release channel, if any
  pub fn channel(&self) -> Option<&str> {
    self.channel.as_deref()
  }

  pub(crate) fn set_channel(&mut self, channel: Option<String>) {
    self.channel = channel;
  }

  pub fn timestamp(&self) -> DateTime<Utc> {
    self.timestamp
  }

  pub fn last_version(&self) -> Option<&Version> {
    self.last_version.as_ref()
  }

  pub fn last_tag(&self) -> Option<&str> {
    self.last_tag.as_deref()
  }

  /// Record the last release anchor (write-once, even when there is none)
  pub fn set_last_release(&mut self, version: Option<Version>, tag: Option<String>) -> ReleaseResult<()> {
    if self.anchored {
      return Err(ContextError::AlreadySet { field: "last_version" }.into());
    }
    self.anchored = true;
    self.last_version = version;
    self.last_tag = tag;
    Ok(())
  }

  pub fn commits(&self) -> &[CommitRecord] {
    &self.commits
  }

  /// Append commits after those already present
  pub fn extend_commits(&mut self, commits: impl IntoIterator<Item = CommitRecord>) {
    self.commits.extend(commits);
  }

  pub fn release_type(&self) -> Option<ReleaseType> {
    self.release_type
  }

  pub fn set_release_type(&mut self, release_type: ReleaseType) -> ReleaseResult<()> {
    if self.release_type.is_some() {
      return Err(ContextError::AlreadySet { field: "release_type" }.into());
    }
    self.release_type = Some(release_type);
    Ok(())
  }

  pub fn next_version(&self) -> Option<&Version> {
    self.next_version.as_ref()
  }

  pub fn set_next_version(&mut self, version: Version) -> ReleaseResult<()> {
    if self.next_version.is_some() {
      return Err(ContextError::AlreadySet { field: "next_version" }.into());
    }
    self.next_version = Some(version);
    Ok(())
  }

  pub fn tag(&self) -> Option<&str> {
    self.tag.as_deref()
  }

  pub fn set_tag(&mut self, tag: impl Into<String>) -> ReleaseResult<()> {
    if self.tag.is_some() {
      return Err(ContextError::AlreadySet { field: "tag" }.into());
    }
    self.tag = Some(tag.into());
    Ok(())
  }

  pub fn notes(&self) -> Option<&str> {
    self.notes.as_deref()
  }

  /// Append a block of notes; blocks are separated by a blank line
  pub fn append_notes(&mut self, text: &str) {
    let text = text.trim_end();
    if text.is_empty() {
      return;
    }
    match &mut self.notes {
      Some(existing) => {
        existing.push_str("\n\n");
        existing.push_str(text);
      }
      None => self.notes = Some(text.to_string()),
    }
  }

  pub fn changed_files(&self) -> &BTreeSet<PathBuf> {
    &self.changed_files
  }

  /// Record a file (relative to the repository root) modified by this run
  pub fn record_changed_file(&mut self, path: impl AsRef<Path>) {
    self.changed_files.insert(path.as_ref().to_path_buf());
  }

  pub fn assets(&self) -> &[AssetRef] {
    &self.assets
  }

  pub fn push_asset(&mut self, asset: AssetRef) {
    self.assets.push(asset);
  }

  /// Every concrete asset path resolved so far, in insertion order
  pub fn resolved_assets(&self) -> Vec<PathBuf> {
    self.assets.iter().flat_map(|a| a.resolved.iter().cloned()).collect()
  }

  pub fn releases(&self) -> &[ReleaseHandle] {
    &self.releases
  }

  pub fn push_release(&mut self, handle: ReleaseHandle) {
    self.releases.push(handle);
  }

  pub fn history(&self) -> &[StepRecord] {
    &self.history
  }

  pub(crate) fn record_step(&mut self, step: Step, plugin: &str) {
    self.history.push(StepRecord {
      step,
      plugin: plugin.to_string(),
    });
  }

  pub fn warnings(&self) -> &[String] {
    &self.warnings
  }

  pub fn warn(&mut self, message: impl Into<String>) {
    self.warnings.push(message.into());
  }

  pub fn errors(&self) -> &[String] {
    &self.errors
  }

  pub(crate) fn record_error(&mut self, message: impl Into<String>) {
    self.errors.push(message.into());
  }
}
