//! Engine trait definitions for dependency injection

use async_trait::async_trait;

use crate::error::EngineResult;
use shared::{AdminConfig, AttemptFailure, ImageData, ProviderDescriptor, RenderParams};

/// Read/write access to the admin-managed provider configuration.
///
/// `load` returns `None` when nothing has been configured yet; callers
/// treat that as zero admin providers, not as an error.
#[mockall::automock]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> EngineResult<Option<AdminConfig>>;

    async fn save(&self, config: &AdminConfig) -> EngineResult<()>;
}

/// Dispatches one generation attempt to the adapter matching the
/// descriptor's family.
///
/// Single attempt, no internal retry; retry and fallback belong to the
/// engine so failure accounting stays centralized. Implementations must
/// not touch shared health state.
#[mockall::automock]
#[async_trait]
pub trait AdapterDispatch: Send + Sync {
    async fn generate(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        params: &RenderParams,
    ) -> Result<ImageData, AttemptFailure>;
}
