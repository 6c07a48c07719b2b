//! Release domain: commits, versions, notes, manifests, assets and hosting
//!
//! Everything here is independent of the pipeline. The plugins in
//! `crate::pipeline::plugins` compose these pieces into stages.

pub mod assets;
pub mod commits;
pub mod hosting;
pub mod manifest;
pub mod notes;
pub mod version;

pub use assets::AssetRef;
pub use commits::{CommitRecord, CommitType};
pub use hosting::{DirectoryHost, ReleaseHandle, ReleaseHost};
pub use version::{ReleaseType, TagFormat};
