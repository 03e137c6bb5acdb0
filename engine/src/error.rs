//! Engine error types

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can escape the engine.
///
/// Per-attempt provider failures never appear here; they are absorbed
/// into trace entries and health updates. Only infrastructure problems
/// (configuration store access, malformed config documents) propagate.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration store error: {message}")]
    ConfigStore { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
