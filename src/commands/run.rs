//! `releasekit run` / `releasekit plan`

use crate::commands::load_config;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::vcs::{SystemGit, VersionControl};
use crate::pipeline::{Orchestrator, ReleaseLocks, ReleaseOutcome, RunMode, StageRegistry};
use crate::release::DirectoryHost;
use chrono::Utc;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Flags shared by `run` and `plan`
#[derive(Debug, Default)]
pub struct RunOptions {
  /// Release this branch instead of the checked-out one
  pub branch: Option<String>,
  pub dry_run: bool,
  pub json: bool,
  pub config: Option<PathBuf>,
}

/// Run the release pipeline for the current (or given) branch
pub fn run_release(options: RunOptions) -> ReleaseResult<()> {
  let root = env::current_dir()?;

  // Configuration problems surface before git is touched
  let (config_path, config) = load_config(&root, options.config.as_deref())?;
  let registry = StageRegistry::from_config(&config)?;
  tracing::info!(config = %config_path.display(), plugins = registry.len(), "configuration loaded");

  let git = SystemGit::open(&root)?;
  let branch = match options.branch {
    Some(branch) => branch,
    None => git.current_branch()?,
  };
  let locks = ReleaseLocks::with_dir(git.git_dir()?.join("releasekit"));
  let host = Arc::new(DirectoryHost::new(root.join(&config.hosting.dir)));
  tracing::debug!(dir = %host.dir().display(), "releases are published to the local directory host");

  let mode = if options.dry_run {
    RunMode::DryRun
  } else {
    RunMode::Release
  };
  let orchestrator = Orchestrator::from_config(&config, Arc::new(git), host, locks, &root)?.with_mode(mode);

  let mut ctx = ReleaseContext::new(branch, Utc::now());
  let outcome = orchestrator.run(&mut ctx, &registry)?;

  if options.json {
    println!("{}", serde_json::to_string_pretty(&outcome)?);
  } else {
    print_outcome(&outcome, &ctx);
  }

  Ok(())
}

fn print_outcome(outcome: &ReleaseOutcome, ctx: &ReleaseContext) {
  for warning in ctx.warnings() {
    println!("⚠️  {}", warning);
  }

  match outcome {
    ReleaseOutcome::NotReleaseBranch { branch } => {
      println!("⚠️  Branch '{}' is not configured for releases", branch);
      println!("   Nothing to do");
    }
    ReleaseOutcome::NoRelease { last_version } => {
      match last_version {
        Some(version) => println!("✅ No relevant changes since {}", version),
        None => println!("✅ No relevant changes to release"),
      }
      println!("   {} commit(s) analyzed", ctx.commits().len());
    }
    ReleaseOutcome::Planned { version, tag, notes } => {
      println!("📦 Release Plan for '{}'", ctx.branch());
      println!();
      match ctx.last_version() {
        Some(last) => println!("  Current:  {}", last),
        None => println!("  Current:  (none)"),
      }
      let bump = ctx.release_type().map(|t| t.as_str()).unwrap_or("custom");
      println!("  Proposed: {} ({})", version, bump);
      println!("  Tag:      {}", tag);
      println!();
      if !notes.is_empty() {
        println!("{}", notes);
        println!();
      }
      println!("🔍 Dry-run mode (no changes applied)");
    }
    ReleaseOutcome::Released {
      version,
      tag,
      changed_files,
      assets,
      releases,
    } => {
      println!("✅ Release {} completed!", version);
      println!();
      for file in changed_files {
        println!("   Updated {}", file.display());
      }
      for asset in assets {
        println!("   Attached {}", asset.display());
      }
      for release in releases {
        println!("   Published {} to {}", release.tag, release.location);
      }
      println!();
      println!("Next steps:");
      println!("  git push origin {} {}", ctx.branch(), tag);
    }
  }
}
