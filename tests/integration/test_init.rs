//! Integration tests for `releasekit init`

use crate::helpers::{TestWorkspace, releasekit, run_releasekit};
use anyhow::Result;

#[test]
fn test_init_writes_usable_config() -> Result<()> {
  let ws = TestWorkspace::new()?;

  run_releasekit(&ws.path, &["init"])?;

  assert!(ws.file_exists("release.toml"));
  run_releasekit(&ws.path, &["check"])?;

  Ok(())
}

#[test]
fn test_init_refuses_to_overwrite_without_force() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("release.toml", "# mine\n")?;

  let output = releasekit(&ws.path, &["init"])?;
  assert!(!output.status.success());
  assert_eq!(ws.read_file("release.toml")?, "# mine\n");

  run_releasekit(&ws.path, &["init", "--force"])?;
  assert!(ws.read_file("release.toml")?.contains("commit-analyzer"));

  Ok(())
}

#[test]
fn test_init_then_release() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_releasekit(&ws.path, &["init"])?;
  ws.commit("feat: adopt releasekit")?;

  let output = run_releasekit(&ws.path, &["run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Release 1.0.0 completed"));
  assert!(ws.file_exists("CHANGELOG.md"));

  Ok(())
}
