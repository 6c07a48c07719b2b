//! Integration tests for `releasekit check`

use crate::helpers::{BASIC_CONFIG, TestWorkspace, releasekit, run_releasekit};
use anyhow::Result;
use serde_json::Value;

#[test]
fn test_check_prints_stage_table() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;

  let output = run_releasekit(&ws.path, &["check"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Configuration is valid"));
  assert!(stdout.contains("analyze-commits"));
  assert!(stdout.contains("commit-analyzer"));
  assert!(stdout.contains("next (prerelease: beta)"));

  Ok(())
}

#[test]
fn test_check_json_lists_stages_in_step_order() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;

  let output = run_releasekit(&ws.path, &["check", "--json"])?;
  let report: Value = serde_json::from_slice(&output.stdout)?;

  let steps: Vec<_> = report["stages"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["step"].as_str().unwrap().to_string())
    .collect();
  assert_eq!(
    steps,
    vec!["analyze-commits", "generate-notes", "update-files", "publish", "commit-back"]
  );
  assert_eq!(report["branches"][1]["channel"], "beta");

  Ok(())
}

#[test]
fn test_check_rejects_exec_without_command() -> Result<()> {
  let config = format!("{}\n[[plugins]]\nname = \"exec\"\n", BASIC_CONFIG);
  let ws = TestWorkspace::with_config(&config)?;

  let output = releasekit(&ws.path, &["check"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("prepare_cmd"));

  Ok(())
}

#[test]
fn test_check_honours_explicit_config_path() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("ci/release.toml", BASIC_CONFIG)?;

  run_releasekit(&ws.path, &["check", "--config", "ci/release.toml"])?;

  let missing = releasekit(&ws.path, &["check", "--config", "ci/other.toml"])?;
  assert_eq!(missing.status.code(), Some(1));

  Ok(())
}
