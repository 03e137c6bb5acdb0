//! WebServer-specific error types

use thiserror::Error;

pub type WebServerResult<T> = Result<T, WebServerError>;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("server startup failed: {message}")]
    Startup { message: String },

    #[error("engine error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("image storage failed: {message}")]
    Storage { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
