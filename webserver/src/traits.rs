//! WebServer trait definitions for dependency injection

use async_trait::async_trait;

use crate::error::WebServerResult;
use shared::ImageData;

/// Binary storage for generated images.
///
/// Invoked by the request layer after a successful generation outcome,
/// never by the engine itself. Returns the public URL of the stored
/// object.
#[mockall::automock]
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, image: &ImageData, name_hint: &str) -> WebServerResult<String>;
}
