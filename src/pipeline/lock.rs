//! Per-branch release locks
//!
//! At most one release run per branch may be in flight. A second claim is
//! rejected with `ConcurrentRelease` immediately; claims are never queued.
//!
//! `ReleaseLocks` is an explicit object shared by cloning. In-process claims
//! are tracked in a shared set; when a lock directory is configured each
//! claim is also materialised as a `<branch>.lock` file created with
//! `create_new`, so separate processes on the same checkout exclude each
//! other as well.

use crate::core::error::{ReleaseError, ReleaseResult};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared registry of in-flight releases
#[derive(Debug, Clone, Default)]
pub struct ReleaseLocks {
  held: Arc<Mutex<HashSet<String>>>,
  dir: Option<PathBuf>,
}

/// Proof of an exclusive claim on a branch; released on drop
#[derive(Debug)]
pub struct LockGuard {
  branch: String,
  held: Arc<Mutex<HashSet<String>>>,
  file: Option<PathBuf>,
}

impl ReleaseLocks {
  /// In-process locks only
  pub fn new() -> Self {
    Self::default()
  }

  /// Locks that are also backed by files in `dir`
  pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
    Self {
      held: Arc::default(),
      dir: Some(dir.into()),
    }
  }

  /// Claim `branch` or fail with `ConcurrentRelease`
  pub fn acquire(&self, branch: &str) -> ReleaseResult<LockGuard> {
    let busy = || ReleaseError::ConcurrentRelease {
      branch: branch.to_string(),
    };

    if !lock_set(&self.held).insert(branch.to_string()) {
      return Err(busy());
    }

    let file = match &self.dir {
      Some(dir) => match create_lock_file(dir, branch) {
        Ok(path) => Some(path),
        Err(e) => {
          lock_set(&self.held).remove(branch);
          if e.kind() == io::ErrorKind::AlreadyExists {
            return Err(busy());
          }
          return Err(e.into());
        }
      },
      None => None,
    };

    tracing::debug!(branch, "release lock acquired");
    Ok(LockGuard {
      branch: branch.to_string(),
      held: Arc::clone(&self.held),
      file,
    })
  }

  /// Whether a run currently holds `branch` in this process
  pub fn is_held(&self, branch: &str) -> bool {
    lock_set(&self.held).contains(branch)
  }
}

impl LockGuard {
  pub fn branch(&self) -> &str {
    &self.branch
  }
}

impl Drop for LockGuard {
  fn drop(&mut self) {
    if let Some(file) = &self.file {
      let _ = fs::remove_file(file);
    }
    lock_set(&self.held).remove(&self.branch);
    tracing::debug!(branch = %self.branch, "release lock released");
  }
}

fn lock_set(held: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
  // A panic while holding the set cannot leave it half-updated
  held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn create_lock_file(dir: &Path, branch: &str) -> io::Result<PathBuf> {
  fs::create_dir_all(dir)?;
  let path = dir.join(format!("{}.lock", lock_file_stem(branch)));
  let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
  writeln!(file, "{}", std::process::id())?;
  Ok(path)
}

/// Branch name made safe for a file name (`feature/x` -> `feature%2Fx`)
fn lock_file_stem(branch: &str) -> String {
  let mut stem = String::with_capacity(branch.len());
  for byte in branch.bytes() {
    if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
      stem.push(byte as char);
    } else {
      stem.push_str(&format!("%{:02X}", byte));
    }
  }
  stem
}
