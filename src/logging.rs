//! Tracing subscriber setup for hosts and tests.

use crate::error::{EngineError, EngineResult};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Returns an error if another subscriber is already installed; callers that may
/// race (tests) should use [`init_tracing_once`].
pub fn init_tracing(default_filter: &str) -> EngineResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| EngineError::Logging(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| EngineError::Logging(e.to_string()))
}

/// Like [`init_tracing`], but a second call is a silent no-op.
pub fn init_tracing_once(default_filter: &str) {
    let _ = init_tracing(default_filter);
}
