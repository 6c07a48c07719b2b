//! Release pipeline
//!
//! - **step**: the fixed, ordered set of pipeline steps
//! - **gate**: which branches may release, and on which channel
//! - **lock**: one release at a time per branch
//! - **plugin**: the contract every stage implementation satisfies
//! - **plugins**: the built-in plugin catalog
//! - **registry**: plugins bound to steps, in registration order
//! - **orchestrator**: runs the steps fail-fast against a release context

pub mod gate;
pub mod lock;
pub mod orchestrator;
pub mod plugin;
pub mod plugins;
pub mod registry;
pub mod step;

#[cfg(test)]
pub(crate) mod testing;

pub use lock::ReleaseLocks;
pub use orchestrator::{Orchestrator, ReleaseOutcome, RunMode};
pub use plugin::Plugin;
pub use registry::StageRegistry;
pub use step::Step;
