//! In-memory collaborators for pipeline tests

use crate::core::context::ReleaseContext;
use crate::core::error::{GitError, PublishError, ReleaseError, ReleaseResult};
use crate::core::vcs::VersionControl;
use crate::pipeline::plugin::{Plugin, PluginEnv};
use crate::pipeline::step::Step;
use crate::release::commits::CommitRecord;
use crate::release::hosting::{ReleaseHandle, ReleaseHost};
use chrono::{DateTime, Utc};
use semver::Version;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

/// 2025-01-15T10:00:00Z
pub fn fixed_time() -> DateTime<Utc> {
  DateTime::parse_from_rfc3339("2025-01-15T10:00:00Z").unwrap().into()
}

/// A commit-back performed against `FakeVcs`
#[derive(Debug, Clone)]
pub struct CommitBack {
  pub files: Vec<PathBuf>,
  pub message: String,
  pub tag: String,
}

#[derive(Default)]
struct FakeRepo {
  commits: Vec<CommitRecord>,
  /// tag -> number of commits it covers
  tags: BTreeMap<String, usize>,
  commit_backs: Vec<CommitBack>,
  since_requests: Vec<Option<String>>,
  reads: usize,
}

/// Linear history: the given tags all sit before the given commits
pub struct FakeVcs {
  repo: Mutex<FakeRepo>,
  reachable: bool,
  root: PathBuf,
}

impl FakeVcs {
  pub fn new(tags: &[&str], messages: &[&str]) -> Self {
    let repo = FakeRepo {
      commits: messages
        .iter()
        .enumerate()
        .map(|(i, m)| CommitRecord::from_message(format!("{:040x}", i + 1), m))
        .collect(),
      tags: tags.iter().map(|t| (t.to_string(), 0)).collect(),
      ..FakeRepo::default()
    };
    Self {
      repo: Mutex::new(repo),
      reachable: true,
      root: PathBuf::from("."),
    }
  }

  /// A repository every read of which fails
  pub fn unreachable() -> Self {
    Self {
      reachable: false,
      ..Self::new(&[], &[])
    }
  }

  pub fn commit_backs(&self) -> Vec<CommitBack> {
    self.repo.lock().unwrap().commit_backs.clone()
  }

  pub fn commits_requested_since(&self) -> Vec<Option<String>> {
    self.repo.lock().unwrap().since_requests.clone()
  }

  /// Number of tag and log reads
  pub fn history_reads(&self) -> usize {
    self.repo.lock().unwrap().reads
  }

  fn check_reachable(&self) -> ReleaseResult<()> {
    if self.reachable {
      return Ok(());
    }
    Err(ReleaseError::Git(GitError::CommandFailed {
      command: "git tag --merged HEAD".to_string(),
      stderr: "fatal: unable to access repository".to_string(),
    }))
  }
}

impl VersionControl for FakeVcs {
  fn current_branch(&self) -> ReleaseResult<String> {
    Ok("main".to_string())
  }

  fn tags(&self) -> ReleaseResult<Vec<String>> {
    self.check_reachable()?;
    let mut repo = self.repo.lock().unwrap();
    repo.reads += 1;
    Ok(repo.tags.keys().cloned().collect())
  }

  fn list_commits_since(&self, since: Option<&str>) -> ReleaseResult<Vec<CommitRecord>> {
    self.check_reachable()?;
    let mut repo = self.repo.lock().unwrap();
    repo.reads += 1;
    repo.since_requests.push(since.map(str::to_string));
    let start = since.and_then(|t| repo.tags.get(t).copied()).unwrap_or(0);
    Ok(repo.commits[start..].to_vec())
  }

  fn commit_and_tag(&self, files: &[PathBuf], message: &str, tag: &str) -> ReleaseResult<String> {
    let mut repo = self.repo.lock().unwrap();
    if !files.is_empty() {
      let sha = format!("{:040x}", repo.commits.len() + 1);
      repo.commits.push(CommitRecord::from_message(sha, message));
    }
    let head = repo.commits.len();
    repo.tags.insert(tag.to_string(), head);
    repo.commit_backs.push(CommitBack {
      files: files.to_vec(),
      message: message.to_string(),
      tag: tag.to_string(),
    });
    Ok(format!("{:040x}", head))
  }

  fn git_dir(&self) -> ReleaseResult<PathBuf> {
    Ok(self.root.join(".git"))
  }

  fn work_tree(&self) -> &Path {
    &self.root
  }
}

/// Host that remembers what was published
#[derive(Default)]
pub struct FakeHost {
  existing: Mutex<HashSet<String>>,
  published: Mutex<Vec<String>>,
  calls: Mutex<usize>,
}

impl FakeHost {
  pub fn with_existing(tags: &[&str]) -> Self {
    Self {
      existing: Mutex::new(tags.iter().map(|t| t.to_string()).collect()),
      ..Self::default()
    }
  }

  pub fn published_tags(&self) -> Vec<String> {
    self.published.lock().unwrap().clone()
  }

  pub fn publish_calls(&self) -> usize {
    *self.calls.lock().unwrap()
  }
}

impl ReleaseHost for FakeHost {
  fn publish(&self, tag: &str, _notes: &str, assets: &[PathBuf]) -> Result<ReleaseHandle, PublishError> {
    *self.calls.lock().unwrap() += 1;
    if !self.existing.lock().unwrap().insert(tag.to_string()) {
      return Err(PublishError::Duplicate { tag: tag.to_string() });
    }
    self.published.lock().unwrap().push(tag.to_string());
    Ok(ReleaseHandle {
      tag: tag.to_string(),
      location: format!("fake://{}", tag),
      assets: assets
        .iter()
        .map(|p| crate::release::hosting::PublishedAsset {
          name: p.display().to_string(),
          size: 0,
          sha256: String::new(),
        })
        .collect(),
    })
  }
}

enum Behavior {
  /// Record the notes seen, then optionally append a block
  Notes(Arc<Mutex<Vec<Option<String>>>>, Option<String>),
  PinVersion(Version),
  Block(Mutex<Sender<()>>, Mutex<Receiver<()>>),
}

/// Scriptable plugin bound to a single step
pub struct RecordingPlugin {
  name: String,
  step: Step,
  behavior: Behavior,
}

impl RecordingPlugin {
  /// Plugin that records `ctx.notes()` when called and then appends `append`
  pub fn new(name: &str, step: Step, append: Option<&str>) -> (Self, Arc<Mutex<Vec<Option<String>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let plugin = Self {
      name: name.to_string(),
      step,
      behavior: Behavior::Notes(Arc::clone(&seen), append.map(str::to_string)),
    };
    (plugin, seen)
  }

  /// Analyze-step plugin that chooses the next version itself
  pub fn pinning_version(version: Version) -> Self {
    Self {
      name: "pin".to_string(),
      step: Step::AnalyzeCommits,
      behavior: Behavior::PinVersion(version),
    }
  }

  /// Plugin that signals `entered` and then waits for `release`
  pub fn blocking(step: Step, entered: Sender<()>, release: Receiver<()>) -> Self {
    Self {
      name: "blocking".to_string(),
      step,
      behavior: Behavior::Block(Mutex::new(entered), Mutex::new(release)),
    }
  }

  fn act(&self, ctx: &mut ReleaseContext) -> ReleaseResult<()> {
    match &self.behavior {
      Behavior::Notes(seen, append) => {
        seen.lock().unwrap().push(ctx.notes().map(str::to_string));
        if let Some(text) = append {
          ctx.append_notes(text);
        }
        Ok(())
      }
      Behavior::PinVersion(version) => ctx.set_next_version(version.clone()),
      Behavior::Block(entered, release) => {
        let _ = entered.lock().unwrap().send(());
        let _ = release.lock().unwrap().recv();
        Ok(())
      }
    }
  }
}

fn single_step(step: Step) -> &'static [Step] {
  match step {
    Step::AnalyzeCommits => &[Step::AnalyzeCommits],
    Step::GenerateNotes => &[Step::GenerateNotes],
    Step::UpdateFiles => &[Step::UpdateFiles],
    Step::Prepare => &[Step::Prepare],
    Step::Publish => &[Step::Publish],
    Step::CommitBack => &[Step::CommitBack],
  }
}

impl Plugin for RecordingPlugin {
  fn name(&self) -> &str {
    &self.name
  }

  fn steps(&self) -> &'static [Step] {
    single_step(self.step)
  }

  fn analyze_commits(&self, ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    self.act(ctx)
  }

  fn generate_notes(&self, ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    self.act(ctx)
  }

  fn update_files(&self, ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    self.act(ctx)
  }

  fn prepare(&self, ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    self.act(ctx)
  }

  fn publish(&self, ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    self.act(ctx)
  }

  fn commit_back(&self, ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    self.act(ctx)
  }
}
