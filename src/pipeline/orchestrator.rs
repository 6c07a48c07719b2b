//! Pipeline orchestrator
//!
//! Runs the fixed step sequence against one `ReleaseContext`:
//!
//! ```text
//! gate ─> lock ─> history ─> analyze-commits ─┬─> none: NoRelease
//!                                             └─> version/tag ─> generate-notes
//!   ─> update-files ─> prepare ─> publish ─> commit-back ─> Released
//! ```
//!
//! Fail-fast: the first plugin error aborts the run. Publish comes before
//! commit-back, so a failed publish never leaves a recorded version bump
//! behind. Commit-back is the only durable side effect on the repository and
//! it runs last, which makes re-running a failed pipeline safe.

use crate::core::config::{BranchSpec, ReleaseConfig};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::VersionControl;
use crate::pipeline::gate;
use crate::pipeline::lock::ReleaseLocks;
use crate::pipeline::plugin::{PluginEnv, run_step};
use crate::pipeline::registry::StageRegistry;
use crate::pipeline::step::Step;
use crate::release::hosting::{ReleaseHandle, ReleaseHost};
use crate::release::version::{self, TagFormat};
use semver::Version;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Whether a run goes all the way or stops after the notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
  #[default]
  Release,
  /// Stop after generate-notes; nothing is written
  DryRun,
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ReleaseOutcome {
  Released {
    version: Version,
    tag: String,
    changed_files: Vec<PathBuf>,
    assets: Vec<PathBuf>,
    releases: Vec<ReleaseHandle>,
  },
  NoRelease {
    last_version: Option<Version>,
  },
  NotReleaseBranch {
    branch: String,
  },
  Planned {
    version: Version,
    tag: String,
    notes: String,
  },
}

pub struct Orchestrator {
  vcs: Arc<dyn VersionControl>,
  host: Arc<dyn ReleaseHost>,
  locks: ReleaseLocks,
  root: PathBuf,
  branches: Vec<BranchSpec>,
  tag_format: TagFormat,
  initial_version: Version,
  mode: RunMode,
}

impl Orchestrator {
  pub fn new(
    vcs: Arc<dyn VersionControl>,
    host: Arc<dyn ReleaseHost>,
    locks: ReleaseLocks,
    root: impl Into<PathBuf>,
    branches: Vec<BranchSpec>,
  ) -> Self {
    Self {
      vcs,
      host,
      locks,
      root: root.into(),
      branches,
      tag_format: TagFormat::default(),
      initial_version: Version::new(1, 0, 0),
      mode: RunMode::Release,
    }
  }

  /// Orchestrator wired with the branch, tag and version settings of `config`
  pub fn from_config(
    config: &ReleaseConfig,
    vcs: Arc<dyn VersionControl>,
    host: Arc<dyn ReleaseHost>,
    locks: ReleaseLocks,
    root: impl Into<PathBuf>,
  ) -> ReleaseResult<Self> {
    let tag_format = TagFormat::new(&config.tag_format).ok_or_else(|| {
      ReleaseError::message(format!("Tag format '{}' has no version placeholder", config.tag_format))
    })?;

    Ok(
      Self::new(vcs, host, locks, root, config.branches.clone())
        .with_tag_format(tag_format)
        .with_initial_version(config.initial_version()?),
    )
  }

  pub fn with_mode(mut self, mode: RunMode) -> Self {
    self.mode = mode;
    self
  }

  pub fn with_tag_format(mut self, tag_format: TagFormat) -> Self {
    self.tag_format = tag_format;
    self
  }

  pub fn with_initial_version(mut self, initial_version: Version) -> Self {
    self.initial_version = initial_version;
    self
  }

  /// Execute the pipeline for the branch recorded in `ctx`
  pub fn run(&self, ctx: &mut ReleaseContext, registry: &StageRegistry) -> ReleaseResult<ReleaseOutcome> {
    let branch = ctx.branch().to_string();
    let span = tracing::info_span!("release", %branch);
    let _enter = span.enter();

    let Some(channel) = gate::find_channel(&branch, &self.branches) else {
      tracing::info!("branch is not a release channel");
      return Ok(ReleaseOutcome::NotReleaseBranch { branch });
    };
    ctx.set_channel(channel.prerelease.clone());

    let _guard = self.locks.acquire(&branch)?;

    let last_stable = self.load_history(ctx)?;

    let env = PluginEnv {
      root: &self.root,
      vcs: self.vcs.as_ref(),
      host: self.host.as_ref(),
    };

    self.run_stage(Step::AnalyzeCommits, ctx, registry, &env)?;

    let release_type = ctx.release_type().unwrap_or(version::ReleaseType::None);
    if release_type == version::ReleaseType::None {
      tracing::info!("no release-worthy changes");
      return Ok(ReleaseOutcome::NoRelease {
        last_version: ctx.last_version().cloned(),
      });
    }

    let next = self.resolve_version(ctx, release_type, last_stable.as_ref())?;
    let tag = self.tag_format.format(&next);
    ctx.set_tag(tag.clone())?;
    tracing::info!(version = %next, %tag, %release_type, "next version resolved");

    self.run_stage(Step::GenerateNotes, ctx, registry, &env)?;

    if self.mode == RunMode::DryRun {
      return Ok(ReleaseOutcome::Planned {
        version: next,
        tag,
        notes: ctx.notes().unwrap_or_default().to_string(),
      });
    }

    for step in [Step::UpdateFiles, Step::Prepare, Step::Publish, Step::CommitBack] {
      self.run_stage(step, ctx, registry, &env)?;
    }

    Ok(ReleaseOutcome::Released {
      version: next,
      tag,
      changed_files: ctx.changed_files().iter().cloned().collect(),
      assets: ctx.resolved_assets(),
      releases: ctx.releases().to_vec(),
    })
  }

  /// Anchor the last release and collect the commits made since
  ///
  /// Returns the highest stable version among the tags, which a prerelease
  /// channel bumps from.
  fn load_history(&self, ctx: &mut ReleaseContext) -> ReleaseResult<Option<Version>> {
    let tags = self.vcs.tags().map_err(|e| ReleaseError::analysis(e.to_string()))?;

    let channel = ctx.channel().map(str::to_string);
    let parsed: Vec<(Version, &String)> = tags
      .iter()
      .filter_map(|tag| self.tag_format.parse(tag).map(|v| (v, tag)))
      .filter(|(v, _)| counts_for_channel(v, channel.as_deref()))
      .collect();

    let last_stable = parsed
      .iter()
      .map(|(v, _)| v)
      .filter(|v| v.pre.is_empty())
      .max()
      .cloned();
    let last = parsed.into_iter().max_by(|(a, _), (b, _)| a.cmp(b));

    let (last_version, last_tag) = match last {
      Some((version, tag)) => (Some(version), Some(tag.clone())),
      None => (None, None),
    };

    let commits = self
      .vcs
      .list_commits_since(last_tag.as_deref())
      .map_err(|e| ReleaseError::analysis(e.to_string()))?;

    tracing::debug!(
      last_tag = last_tag.as_deref().unwrap_or("none"),
      commits = commits.len(),
      "history loaded"
    );

    ctx.set_last_release(last_version, last_tag)?;
    ctx.extend_commits(commits);
    Ok(last_stable)
  }

  /// Next version from the plugin (if one set it) or from the release type
  fn resolve_version(
    &self,
    ctx: &mut ReleaseContext,
    release_type: version::ReleaseType,
    last_stable: Option<&Version>,
  ) -> ReleaseResult<Version> {
    let next = match ctx.next_version() {
      Some(v) => v.clone(),
      None => {
        let next = version::next_version(
          ctx.last_version(),
          last_stable,
          release_type,
          ctx.channel(),
          &self.initial_version,
        )
        .ok_or_else(|| ReleaseError::message("No next version for a release type of none"))?;
        ctx.set_next_version(next.clone())?;
        next
      }
    };

    version::ensure_monotonic(ctx.last_version(), &next)?;
    Ok(next)
  }

  fn run_stage(
    &self,
    step: Step,
    ctx: &mut ReleaseContext,
    registry: &StageRegistry,
    env: &PluginEnv<'_>,
  ) -> ReleaseResult<()> {
    for plugin in registry.plugins_for(step) {
      let span = tracing::debug_span!("step", %step, plugin = plugin.name());
      let _enter = span.enter();

      ctx.record_step(step, plugin.name());
      if let Err(e) = run_step(plugin.as_ref(), step, ctx, env) {
        tracing::error!(error = %e, "step failed");
        ctx.record_error(format!("{} ({}): {}", step, plugin.name(), e));
        return Err(e);
      }
    }
    Ok(())
  }
}

/// Stable channel: stable tags only. Prerelease channel `id`: stable tags and `id.N` tags.
fn counts_for_channel(version: &Version, channel: Option<&str>) -> bool {
  if version.pre.is_empty() {
    return true;
  }
  match channel {
    Some(id) => version
      .pre
      .as_str()
      .strip_prefix(id)
      .is_some_and(|rest| rest.starts_with('.')),
    None => false,
  }
}
