//! `git`: commit changed files back and tag the release

use super::PluginSpec;
use crate::core::config::{NOTES_PLACEHOLDER, VERSION_PLACEHOLDER};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::pipeline::plugin::{Plugin, PluginEnv};
use crate::pipeline::step::Step;

pub const NAME: &str = "git";

pub const SPEC: PluginSpec = PluginSpec {
  name: NAME,
  steps: &[Step::CommitBack],
  options: &[],
};

pub struct GitPlugin {
  message: String,
}

impl GitPlugin {
  pub fn new(message: String) -> Self {
    Self { message }
  }

  /// Commit message with placeholders filled in
  pub fn render_message(&self, version: &str, notes: &str) -> String {
    self
      .message
      .replace(VERSION_PLACEHOLDER, version)
      .replace(NOTES_PLACEHOLDER, notes)
      .trim_end()
      .to_string()
  }
}

impl Plugin for GitPlugin {
  fn name(&self) -> &str {
    NAME
  }

  fn steps(&self) -> &'static [Step] {
    SPEC.steps
  }

  fn commit_back(&self, ctx: &mut ReleaseContext, env: &PluginEnv<'_>) -> ReleaseResult<()> {
    let (Some(version), Some(tag)) = (ctx.next_version(), ctx.tag()) else {
      return Err(ReleaseError::message("Commit-back needs the next version and tag to be known"));
    };

    let message = self.render_message(&version.to_string(), ctx.notes().unwrap_or_default());
    let files: Vec<_> = ctx.changed_files().iter().cloned().collect();

    let sha = env.vcs.commit_and_tag(&files, &message, tag)?;
    tracing::info!(%tag, %sha, files = files.len(), "release committed and tagged");
    Ok(())
  }
}
