//! Plugin contract
//!
//! A plugin declares which steps it implements and gets called once per
//! declared step with exclusive access to the release context. Methods for
//! steps a plugin does not declare are never called.

use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::vcs::VersionControl;
use crate::pipeline::step::Step;
use crate::release::hosting::ReleaseHost;
use std::path::Path;

/// Collaborators a plugin may use during a step
pub struct PluginEnv<'a> {
  /// Working tree root; relative paths in configuration resolve against it
  pub root: &'a Path,
  pub vcs: &'a dyn VersionControl,
  pub host: &'a dyn ReleaseHost,
}

/// A unit contributing behavior to one or more steps
pub trait Plugin: Send + Sync {
  /// Identity used in configuration and reports
  fn name(&self) -> &str;

  /// Steps this plugin implements; fixed for the plugin's lifetime
  fn steps(&self) -> &'static [Step];

  fn analyze_commits(&self, _ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    Ok(())
  }

  fn generate_notes(&self, _ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    Ok(())
  }

  fn update_files(&self, _ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    Ok(())
  }

  fn prepare(&self, _ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    Ok(())
  }

  fn publish(&self, _ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    Ok(())
  }

  fn commit_back(&self, _ctx: &mut ReleaseContext, _env: &PluginEnv<'_>) -> ReleaseResult<()> {
    Ok(())
  }
}

/// Invoke the method of `plugin` that implements `step`
pub fn run_step(plugin: &dyn Plugin, step: Step, ctx: &mut ReleaseContext, env: &PluginEnv<'_>) -> ReleaseResult<()> {
  match step {
    Step::AnalyzeCommits => plugin.analyze_commits(ctx, env),
    Step::GenerateNotes => plugin.generate_notes(ctx, env),
    Step::UpdateFiles => plugin.update_files(ctx, env),
    Step::Prepare => plugin.prepare(ctx, env),
    Step::Publish => plugin.publish(ctx, env),
    Step::CommitBack => plugin.commit_back(ctx, env),
  }
}
