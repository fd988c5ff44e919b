//! Error types for the fallible edges of the engine.
//!
//! Interaction paths never fail (unknown ids are no-ops, zoom is clamped). Only
//! settings persistence, file watching and logging setup can return errors.

use thiserror::Error;

/// Errors that can occur outside the interaction paths
#[derive(Error, Debug)]
pub enum EngineError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings (de)serialization error from serde_json
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File watcher setup failed
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// A global tracing subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// No per-user configuration directory on this platform
    #[error("No configuration directory available")]
    NoConfigDir,

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

/// Result type alias for fallible engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Other(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}
