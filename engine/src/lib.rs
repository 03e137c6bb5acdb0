//! Provider orchestration engine for the image generation service
//!
//! Resolves the configured providers into a ranked candidate list,
//! attempts generation against each in order with failure-driven circuit
//! breaking, and returns a single outcome with a full attempt trace.

pub mod engine_impl;
pub mod error;
pub mod services;
pub mod traits;

// Re-export main types
pub use engine_impl::{Engine, EngineSettings};
pub use error::{EngineError, EngineResult};
pub use services::*;
pub use traits::*;
