//! Disk-backed image storage

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::WebServerResult;
use crate::traits::ImageStore;
use shared::ImageData;

/// Stores generated images under a local directory and returns URLs
/// under the server's public mount (`/images` by default).
pub struct DiskImageStore {
    root: PathBuf,
    public_base: String,
}

impl DiskImageStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

/// Filesystem-safe slug from a caller-supplied hint
fn slug(name_hint: &str) -> String {
    let cleaned: String = name_hint
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.chars().take(40).collect()
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn store(&self, image: &ImageData, name_hint: &str) -> WebServerResult<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let filename = format!(
            "{}_{}_{}.{}",
            slug(name_hint),
            Utc::now().format("%Y%m%d_%H%M%S"),
            Uuid::new_v4(),
            image.format
        );
        let path = self.root.join(&filename);
        tokio::fs::write(&path, &image.bytes).await?;

        Ok(format!(
            "{}/{}",
            self.public_base.trim_end_matches('/'),
            filename
        ))
    }
}
