//! `changelog`: prepend the release notes to a changelog file

use super::{PluginSpec, string_option};
use crate::core::config::PluginBinding;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::pipeline::plugin::{Plugin, PluginEnv};
use crate::pipeline::step::Step;
use crate::release::notes::prepend_to_changelog;
use std::fs;
use std::path::PathBuf;

pub const NAME: &str = "changelog";

pub const SPEC: PluginSpec = PluginSpec {
  name: NAME,
  steps: &[Step::UpdateFiles],
  options: &["file", "title"],
};

pub struct ChangelogPlugin {
  file: PathBuf,
  title: String,
}

impl ChangelogPlugin {
  pub fn from_binding(binding: &PluginBinding) -> ReleaseResult<Self> {
    Ok(Self {
      file: string_option(binding, "file")?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("CHANGELOG.md")),
      title: string_option(binding, "title")?.unwrap_or_else(|| "# Changelog".to_string()),
    })
  }
}

impl Plugin for ChangelogPlugin {
  fn name(&self) -> &str {
    NAME
  }

  fn steps(&self) -> &'static [Step] {
    SPEC.steps
  }

  fn update_files(&self, ctx: &mut ReleaseContext, env: &PluginEnv<'_>) -> ReleaseResult<()> {
    let Some(notes) = ctx.notes().map(str::to_string) else {
      ctx.warn(format!("No release notes to add to {}", self.file.display()));
      return Ok(());
    };

    let path = env.root.join(&self.file);
    let existing = if path.exists() {
      Some(fs::read_to_string(&path).with_context(|| format!("Failed to read changelog {}", path.display()))?)
    } else {
      None
    };

    let content = prepend_to_changelog(existing.as_deref(), &self.title, &notes);

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write changelog {}", path.display()))?;

    tracing::info!(file = %self.file.display(), "changelog updated");
    ctx.record_changed_file(&self.file);
    Ok(())
  }
}
