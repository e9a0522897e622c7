//! Log subscriber setup
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the embedding application. `init` is the one-line setup for callers
//! that just want the configured level on stderr.

use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;
use crate::error::{StrataError, StrataResult};

/// The filter for a configured level
///
/// `RUST_LOG`, when set and valid, takes precedence over `level`.
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strata={}", level.as_filter())))
}

/// Install a global fmt subscriber at the given level
///
/// Fails if a global subscriber is already installed.
pub fn init(level: LogLevel) -> StrataResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_level(true)
        .try_init()
        .map_err(|e| StrataError::config(format!("cannot install log subscriber: {}", e)))
}
