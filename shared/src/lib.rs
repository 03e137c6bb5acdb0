//! Shared types for the image generation service
//!
//! Common types, error taxonomy, admin configuration schema, and tracing
//! setup used by the engine and the webserver.

pub mod config;
pub mod errors;
pub mod logging;
pub mod types;

// Re-export main types
pub use config::{AdminConfig, AdminProviderEntry};
pub use errors::{AttemptFailure, TerminalFailure};
pub use types::*;
