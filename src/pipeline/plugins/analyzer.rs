//! `commit-analyzer`: decide the release type from classified commits
//!
//! Breaking changes are always major. Other commits map through the release
//! rules: `feat` is minor, `fix`/`perf`/`revert` are patch, everything else
//! (including unclassified commits) is none unless `release_rules` says
//! otherwise. The highest type across all commits wins.

use super::{PluginSpec, string_map_option};
use crate::core::config::PluginBinding;
use crate::core::context::ReleaseContext;
use crate::core::error::{ConfigError, ReleaseResult};
use crate::pipeline::plugin::{Plugin, PluginEnv};
use crate::pipeline::step::Step;
use crate::release::commits::{CommitRecord, CommitType};
use crate::release::version::ReleaseType;
use std::collections::BTreeMap;

pub const NAME: &str = "commit-analyzer";

pub const SPEC: PluginSpec = PluginSpec {
  name: NAME,
  steps: &[Step::AnalyzeCommits],
  options: &["release_rules"],
};

pub struct CommitAnalyzer {
  rules: BTreeMap<CommitType, ReleaseType>,
}

impl Default for CommitAnalyzer {
  fn default() -> Self {
    let rules = BTreeMap::from([
      (CommitType::Feat, ReleaseType::Minor),
      (CommitType::Fix, ReleaseType::Patch),
      (CommitType::Perf, ReleaseType::Patch),
      (CommitType::Revert, ReleaseType::Patch),
    ]);
    Self { rules }
  }
}

impl CommitAnalyzer {
  pub fn from_binding(binding: &PluginBinding) -> ReleaseResult<Self> {
    let mut analyzer = Self::default();

    for (key, value) in string_map_option(binding, "release_rules")? {
      let commit_type = CommitType::parse(&key);
      if commit_type.key() != key.to_lowercase() {
        return Err(
          ConfigError::InvalidValue {
            field: format!("plugins.{}.options.release_rules.{}", NAME, key),
            reason: "unknown commit type".to_string(),
          }
          .into(),
        );
      }
      let release_type = ReleaseType::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
        field: format!("plugins.{}.options.release_rules.{}", NAME, key),
        reason: format!("'{}' is not one of major, minor, patch, none", value),
      })?;
      analyzer.rules.insert(commit_type, release_type);
    }

    Ok(analyzer)
  }

  /// Release type contributed by a single commit
  pub fn classify(&self, commit: &CommitRecord) -> ReleaseType {
    if commit.breaking {
      return ReleaseType::Major;
    }
    commit
      .parsed_type
      .and_then(|t| self.rules.get(&t).copied())
      .unwrap_or(ReleaseType::None)
  }

  /// Highest release type across `commits`
  pub fn analyze(&self, commits: &[CommitRecord]) -> ReleaseType {
    commits
      .iter()
      .map(|c| self.classify(c))
      .max()
      .unwrap_or(ReleaseType::None)
  }
}

impl Plugin for CommitAnalyzer {
  fn name(&self) -> &str {
    NAME
  }

  fn steps(&self) -> &'static [Step] {
    SPEC.steps
  }

  fn analyze_commits(&self, ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    let release_type = self.analyze(ctx.commits());
    tracing::info!(commits = ctx.commits().len(), %release_type, "commits analyzed");
    ctx.set_release_type(release_type)
  }
}
