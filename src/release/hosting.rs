//! Release hosting: the external service a release is published to
//!
//! `ReleaseHost` is the seam the publish step talks through. The built-in
//! `DirectoryHost` stores each release as a directory named after its tag:
//!
//! ```text
//! .releases/
//!   v1.3.0/
//!     release.json   # tag, notes, asset names and SHA-256 digests
//!     NOTES.md
//!     app.tar.gz
//! ```

use crate::core::error::PublishError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A published asset as recorded by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedAsset {
  pub name: String,
  pub size: u64,
  pub sha256: String,
}

/// Reference to a release created by a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseHandle {
  pub tag: String,
  /// Host-specific location (directory, URL, ...)
  pub location: String,
  pub assets: Vec<PublishedAsset>,
}

/// Something releases can be published to
pub trait ReleaseHost: Send + Sync {
  /// Create the release `tag` with `notes` and upload `assets` (absolute paths)
  ///
  /// Must fail with `PublishError::Duplicate` if `tag` was already published.
  fn publish(&self, tag: &str, notes: &str, assets: &[PathBuf]) -> Result<ReleaseHandle, PublishError>;
}

/// Host that keeps releases in a local directory
#[derive(Debug, Clone)]
pub struct DirectoryHost {
  dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct ReleaseManifest {
  tag: String,
  notes: String,
  assets: Vec<PublishedAsset>,
}

impl DirectoryHost {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn write_release(&self, release_dir: &Path, tag: &str, notes: &str, assets: &[PathBuf]) -> io::Result<ReleaseHandle> {
    let mut published = Vec::with_capacity(assets.len());
    let mut names = HashSet::new();

    for asset in assets {
      let name = asset
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("{} has no file name", asset.display())))?;
      if !names.insert(name.clone()) {
        return Err(io::Error::new(
          io::ErrorKind::AlreadyExists,
          format!("two assets share the file name '{}'", name),
        ));
      }

      let bytes = fs::read(asset)?;
      fs::write(release_dir.join(&name), &bytes)?;
      published.push(PublishedAsset {
        name,
        size: bytes.len() as u64,
        sha256: format!("{:x}", Sha256::digest(&bytes)),
      });
    }

    fs::write(release_dir.join("NOTES.md"), notes)?;

    let manifest = ReleaseManifest {
      tag: tag.to_string(),
      notes: notes.to_string(),
      assets: published.clone(),
    };
    let json = serde_json::to_string_pretty(&manifest).map_err(io::Error::other)?;
    fs::write(release_dir.join("release.json"), format!("{}\n", json))?;

    Ok(ReleaseHandle {
      tag: tag.to_string(),
      location: release_dir.display().to_string(),
      assets: published,
    })
  }
}

impl ReleaseHost for DirectoryHost {
  fn publish(&self, tag: &str, notes: &str, assets: &[PathBuf]) -> Result<ReleaseHandle, PublishError> {
    let failed = |e: io::Error| PublishError::Failed {
      tag: tag.to_string(),
      reason: e.to_string(),
    };

    fs::create_dir_all(&self.dir).map_err(failed)?;

    let release_dir = self.dir.join(tag);
    // Existing release directory means the tag was already published
    match fs::create_dir(&release_dir) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
        return Err(PublishError::Duplicate { tag: tag.to_string() });
      }
      Err(e) => return Err(failed(e)),
    }

    self.write_release(&release_dir, tag, notes, assets).map_err(|e| {
      let _ = fs::remove_dir_all(&release_dir);
      failed(e)
    })
  }
}
