//! Tracing initialisation for the releasekit binary
//!
//! Logs go to stderr so that `--json` reports on stdout stay machine-readable.
//! `RUST_LOG` overrides the verbosity chosen on the command line.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Map the number of `-v` flags to a default level
pub fn level_for(verbosity: u8) -> Level {
  match verbosity {
    0 => Level::WARN,
    1 => Level::INFO,
    2 => Level::DEBUG,
    _ => Level::TRACE,
  }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(verbosity: u8) {
  let level = level_for(verbosity);
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .try_init()
    .ok();
}
