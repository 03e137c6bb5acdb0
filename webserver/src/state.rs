//! Shared application state for HTTP handlers

use std::sync::Arc;
use std::time::Instant;

use engine::services::adapters::RealAdapterDispatch;
use engine::services::config_store::FileConfigStore;
use engine::Engine;

use crate::traits::ImageStore;

/// The production engine wiring: file-backed admin config, real adapters
pub type AppEngine = Engine<FileConfigStore, RealAdapterDispatch>;

pub struct AppState {
    pub engine: AppEngine,
    pub images: Arc<dyn ImageStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: AppEngine, images: Arc<dyn ImageStore>) -> Self {
        Self {
            engine,
            images,
            started_at: Instant::now(),
        }
    }
}
