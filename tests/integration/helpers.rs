//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Minimal pipeline: analyze, notes, changelog, publish to .releases, commit back
pub const BASIC_CONFIG: &str = r#"
[[branches]]
name = "main"

[[branches]]
name = "next"
prerelease = "beta"

[[plugins]]
name = "commit-analyzer"
[[plugins]]
name = "release-notes"
[[plugins]]
name = "changelog"
[[plugins]]
name = "release-host"
[[plugins]]
name = "git"
"#;

/// A git repository with one non-conventional commit on `main`
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new repository with a README committed
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    // Initialize git repo with main as default branch
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;
    git(&path, &["config", "tag.gpgsign", "false"])?;

    std::fs::write(path.join("README.md"), "# demo\n")?;
    std::fs::write(path.join(".gitignore"), ".releases/\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Same as `new`, plus a committed release.toml
  pub fn with_config(config: &str) -> Result<Self> {
    let ws = Self::new()?;
    ws.write_file("release.toml", config)?;
    ws.commit("chore: add release config")?;
    Ok(ws)
  }

  /// Write a file (creating parent directories)
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(path);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "--allow-empty", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Get git log subjects, newest first
  pub fn git_log(&self, n: usize) -> Result<Vec<String>> {
    let output = git(&self.path, &["log", &format!("-{}", n), "--format=%s"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// All tags in the repository
  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Whether the working tree has uncommitted changes
  pub fn is_dirty(&self) -> Result<bool> {
    let output = git(&self.path, &["status", "--porcelain"])?;
    Ok(!output.stdout.is_empty())
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run releasekit and return its output, whatever the exit status
pub fn releasekit(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_releasekit");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run releasekit")
}

/// Run releasekit and fail unless it exits successfully
pub fn run_releasekit(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = releasekit(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "releasekit command failed: releasekit {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
