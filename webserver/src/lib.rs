//! HTTP surface for the image generation service
//!
//! Exposes the generation endpoint, provider status and manual-recovery
//! operations, and admin provider CRUD on top of the orchestration
//! engine. Generated images are persisted to disk and served statically.

pub mod error;
pub mod services;
pub mod state;
pub mod traits;
pub mod web;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::{AppEngine, AppState};
pub use traits::ImageStore;

// Re-export service implementations
pub use services::{DiskImageStore, prompt_builder};
