//! Branch gate: decides whether a branch is a release channel
//!
//! Matching is exact. `release/*` in the configuration matches a branch
//! literally named `release/*` and nothing else.

use crate::core::config::BranchSpec;

/// The configured channel for `branch`, if any
pub fn find_channel<'a>(branch: &str, branches: &'a [BranchSpec]) -> Option<&'a BranchSpec> {
  branches.iter().find(|spec| spec.name == branch)
}

/// Whether releases may be cut from `branch`
pub fn is_releasable(branch: &str, branches: &[BranchSpec]) -> bool {
  find_channel(branch, branches).is_some()
}
