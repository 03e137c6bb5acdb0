//! File-backed admin configuration store

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::traits::ConfigStore;
use shared::AdminConfig;

/// Admin configuration persisted as a JSON document on disk.
///
/// A missing file reads as "nothing configured yet", not as an error.
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> EngineResult<Option<AdminConfig>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let mut config: AdminConfig = serde_json::from_slice(&bytes)?;
                config.normalize();
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, config: &AdminConfig) -> EngineResult<()> {
        let mut normalized = config.clone();
        normalized.normalize();

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&normalized)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
