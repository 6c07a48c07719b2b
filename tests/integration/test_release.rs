//! Integration tests for `releasekit run` and `releasekit plan`

use crate::helpers::{BASIC_CONFIG, TestWorkspace, git, releasekit, run_releasekit};
use anyhow::Result;
use serde_json::Value;

fn outcome(stdout: &[u8]) -> Result<Value> {
  Ok(serde_json::from_slice(stdout)?)
}

#[test]
fn test_first_release_end_to_end() -> Result<()> {
  let config = format!(
    r#"{}
[[plugins]]
name = "manifest"

[[manifests]]
files = "package.json"
search = '"version": ".*"'
replace = '"version": "${{version}}"'
"#,
    BASIC_CONFIG
  );
  let ws = TestWorkspace::with_config(&config)?;
  ws.write_file("package.json", "{\n  \"name\": \"demo\",\n  \"version\": \"0.0.0\"\n}\n")?;
  ws.commit("feat(auth): add login")?;
  ws.commit("fix: handle empty password")?;

  let output = run_releasekit(&ws.path, &["run", "--json"])?;
  let report = outcome(&output.stdout)?;

  assert_eq!(report["outcome"], "released");
  assert_eq!(report["version"], "1.0.0");
  assert_eq!(report["tag"], "v1.0.0");

  let changelog = ws.read_file("CHANGELOG.md")?;
  assert!(changelog.starts_with("# Changelog"));
  assert!(changelog.contains("## [1.0.0] - "));
  assert!(changelog.contains("### Features"));
  assert!(changelog.contains("**auth**: add login"));
  assert!(changelog.contains("### Bug Fixes"));

  assert!(ws.read_file("package.json")?.contains("\"version\": \"1.0.0\""));

  assert!(ws.file_exists(".releases/v1.0.0/release.json"));
  assert!(ws.file_exists(".releases/v1.0.0/NOTES.md"));

  assert_eq!(ws.tags()?, vec!["v1.0.0"]);
  assert_eq!(ws.git_log(1)?, vec!["chore(release): 1.0.0 [skip ci]"]);
  assert!(!ws.is_dirty()?, "release commit should include every changed file");

  Ok(())
}

#[test]
fn test_second_run_without_changes_is_no_release() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  ws.commit("feat: first feature")?;
  run_releasekit(&ws.path, &["run"])?;

  let output = run_releasekit(&ws.path, &["run", "--json"])?;
  let report = outcome(&output.stdout)?;

  assert_eq!(report["outcome"], "no-release");
  assert_eq!(report["last_version"], "1.0.0");
  assert_eq!(ws.tags()?, vec!["v1.0.0"]);

  Ok(())
}

#[test]
fn test_follow_up_fix_releases_patch() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  ws.commit("feat: first feature")?;
  run_releasekit(&ws.path, &["run"])?;

  ws.commit("fix: off by one")?;
  ws.commit("docs: typo")?;
  let output = run_releasekit(&ws.path, &["run", "--json"])?;
  let report = outcome(&output.stdout)?;

  assert_eq!(report["version"], "1.0.1");

  let changelog = ws.read_file("CHANGELOG.md")?;
  let newest = changelog.find("## [1.0.1]").unwrap();
  let oldest = changelog.find("## [1.0.0]").unwrap();
  assert!(newest < oldest, "newest entry goes first");
  assert!(changelog.contains("off by one"));
  assert!(!changelog.contains("typo"));

  let mut tags = ws.tags()?;
  tags.sort();
  assert_eq!(tags, vec!["v1.0.0", "v1.0.1"]);

  Ok(())
}

#[test]
fn test_breaking_change_releases_major() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  ws.commit("feat: first feature")?;
  run_releasekit(&ws.path, &["run"])?;

  ws.commit("feat(api)!: drop v1 endpoints")?;
  let output = run_releasekit(&ws.path, &["run", "--json"])?;

  assert_eq!(outcome(&output.stdout)?["version"], "2.0.0");
  assert!(ws.read_file("CHANGELOG.md")?.contains("BREAKING CHANGES"));

  Ok(())
}

#[test]
fn test_plan_writes_nothing() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  ws.commit("feat: first feature")?;

  let output = run_releasekit(&ws.path, &["plan", "--json"])?;
  let report = outcome(&output.stdout)?;

  assert_eq!(report["outcome"], "planned");
  assert_eq!(report["version"], "1.0.0");
  assert!(report["notes"].as_str().unwrap().contains("first feature"));

  assert!(!ws.file_exists("CHANGELOG.md"));
  assert!(!ws.file_exists(".releases"));
  assert!(ws.tags()?.is_empty());
  assert!(!ws.is_dirty()?);

  Ok(())
}

#[test]
fn test_plan_human_output() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  ws.commit("fix: something")?;

  let output = run_releasekit(&ws.path, &["plan"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Proposed: 1.0.0"));
  assert!(stdout.contains("Dry-run"));

  Ok(())
}

#[test]
fn test_non_release_branch_is_a_no_op() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  git(&ws.path, &["checkout", "-b", "feature/login"])?;
  ws.commit("feat: login")?;

  let output = run_releasekit(&ws.path, &["run", "--json"])?;
  let report = outcome(&output.stdout)?;

  assert_eq!(report["outcome"], "not-release-branch");
  assert_eq!(report["branch"], "feature/login");
  assert!(ws.tags()?.is_empty());
  assert!(!ws.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_prerelease_branch_counts_from_one() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  ws.commit("feat: stable feature")?;
  run_releasekit(&ws.path, &["run"])?;

  git(&ws.path, &["checkout", "-b", "next"])?;
  ws.commit("feat: experimental")?;
  let first = outcome(&run_releasekit(&ws.path, &["run", "--json"])?.stdout)?;
  assert_eq!(first["version"], "1.1.0-beta.1");

  ws.commit("fix: experimental bug")?;
  let second = outcome(&run_releasekit(&ws.path, &["run", "--json"])?.stdout)?;
  assert_eq!(second["version"], "1.1.0-beta.2");

  Ok(())
}

#[test]
fn test_prepare_output_is_published_as_asset() -> Result<()> {
  let config = format!(
    r#"{}
[[plugins]]
name = "exec"
options = {{ prepare_cmd = "mkdir -p dist && echo ${{version}} > dist/app-${{version}}.txt" }}

[[assets]]
path = "dist/*.txt"
label = "build"
"#,
    BASIC_CONFIG
  );
  let ws = TestWorkspace::with_config(&config)?;
  ws.write_file(".gitignore", ".releases/\ndist/\n")?;
  ws.commit("feat: ship it")?;

  let report = outcome(&run_releasekit(&ws.path, &["run", "--json"])?.stdout)?;

  assert_eq!(report["assets"][0], "dist/app-1.0.0.txt");
  assert_eq!(ws.read_file(".releases/v1.0.0/app-1.0.0.txt")?.trim(), "1.0.0");

  let manifest: Value = serde_json::from_str(&ws.read_file(".releases/v1.0.0/release.json")?)?;
  assert_eq!(manifest["tag"], "v1.0.0");
  assert_eq!(manifest["assets"][0]["name"], "app-1.0.0.txt");

  Ok(())
}

#[test]
fn test_empty_wildcard_is_only_a_warning() -> Result<()> {
  let config = format!("{}\n[[assets]]\npath = \"dist/*.zip\"\n", BASIC_CONFIG);
  let ws = TestWorkspace::with_config(&config)?;
  ws.commit("feat: no artifacts")?;

  let output = run_releasekit(&ws.path, &["run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("dist/*.zip"));
  assert_eq!(ws.tags()?, vec!["v1.0.0"]);

  Ok(())
}

#[test]
fn test_missing_required_asset_exits_2_without_tag() -> Result<()> {
  let config = format!("{}\n[[assets]]\npath = \"dist/app\"\n", BASIC_CONFIG);
  let ws = TestWorkspace::with_config(&config)?;
  ws.commit("feat: forgot to build")?;

  let output = releasekit(&ws.path, &["run"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("dist/app"));
  assert!(ws.tags()?.is_empty());
  assert!(!ws.file_exists(".releases/v1.0.0"));
  // Files updated before the failure are left for inspection
  assert!(ws.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_manifest_without_match_exits_2() -> Result<()> {
  let config = format!(
    r#"{}
[[plugins]]
name = "manifest"

[[manifests]]
files = "VERSION"
search = '^version=.*$'
replace = 'version=${{version}}'
"#,
    BASIC_CONFIG
  );
  let ws = TestWorkspace::with_config(&config)?;
  ws.write_file("VERSION", "no version line here\n")?;
  ws.commit("feat: something")?;

  let output = releasekit(&ws.path, &["run"])?;

  assert_eq!(output.status.code(), Some(2));
  assert_eq!(ws.read_file("VERSION")?, "no version line here\n");
  assert!(ws.tags()?.is_empty());

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_failing_prepare_command_exits_2() -> Result<()> {
  let config = format!(
    "{}\n[[plugins]]\nname = \"exec\"\noptions = {{ prepare_cmd = \"echo build broke >&2; exit 3\" }}\n",
    BASIC_CONFIG
  );
  let ws = TestWorkspace::with_config(&config)?;
  ws.commit("feat: something")?;

  let output = releasekit(&ws.path, &["run"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("build broke"));
  assert!(!ws.file_exists(".releases/v1.0.0"));
  assert!(ws.tags()?.is_empty());

  Ok(())
}

#[test]
fn test_already_published_tag_exits_2() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  ws.commit("feat: something")?;
  std::fs::create_dir_all(ws.path.join(".releases/v1.0.0"))?;

  let output = releasekit(&ws.path, &["run"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("v1.0.0"));
  assert!(ws.tags()?.is_empty());

  Ok(())
}

#[test]
fn test_held_branch_lock_exits_2() -> Result<()> {
  let ws = TestWorkspace::with_config(BASIC_CONFIG)?;
  ws.commit("feat: something")?;
  std::fs::create_dir_all(ws.path.join(".git/releasekit"))?;
  std::fs::write(ws.path.join(".git/releasekit/main.lock"), "12345\n")?;

  let output = releasekit(&ws.path, &["run"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("already in progress"));
  assert!(!ws.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_invalid_config_exits_1_before_running() -> Result<()> {
  let config = format!("{}\n[[plugins]]\nname = \"slack\"\n", BASIC_CONFIG);
  let ws = TestWorkspace::with_config(&config)?;
  ws.commit("feat: something")?;

  let output = releasekit(&ws.path, &["run"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown plugin 'slack'"));
  assert!(!ws.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_missing_config_exits_1() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = releasekit(&ws.path, &["run"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("releasekit init"));

  Ok(())
}
