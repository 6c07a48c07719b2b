//! `releasekit init`: write a starter release.toml

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use std::env;
use std::fs;

const STARTER: &str = r#"# releasekit configuration
tag_format = "v${version}"
initial_version = "1.0.0"

[[branches]]
name = "main"

# [[branches]]
# name = "next"
# prerelease = "beta"

[[plugins]]
name = "commit-analyzer"

[[plugins]]
name = "release-notes"

[[plugins]]
name = "changelog"

# [[plugins]]
# name = "exec"
# options = { prepare_cmd = "make dist VERSION=${version}" }

[[plugins]]
name = "release-host"

[[plugins]]
name = "git"

[commit]
message = "chore(release): ${version} [skip ci]\n\n${notes}"

[hosting]
dir = ".releases"
"#;

/// Run the init command
pub fn run_init(force: bool) -> ReleaseResult<()> {
  let root = env::current_dir()?;

  if ReleaseConfig::exists(&root) && !force {
    return Err(ReleaseError::with_help(
      format!("A releasekit configuration already exists in {}", root.display()),
      "Use --force to overwrite it.",
    ));
  }

  // Never write something `run` would reject
  ReleaseConfig::parse(STARTER)?;

  let path = root.join("release.toml");
  fs::write(&path, STARTER)?;

  println!("✅ Created {}", path.display());
  println!();
  println!("Next steps:");
  println!("  releasekit check");
  println!("  releasekit plan");
  Ok(())
}
