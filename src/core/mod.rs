//! Core building blocks shared by every command
//!
//! - **config**: release.toml parsing and validation
//! - **context**: the mutable record of one pipeline run
//! - **error**: error types with contextual help messages and exit codes
//! - **vcs**: Git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
