//! Provider adapters: one per backend family, uniform contract
//!
//! Each adapter translates a `(descriptor, prompt)` pair into raw image
//! bytes or a typed failure, hiding the backend's wire format. Adapters
//! make a single attempt and never touch health state.

pub mod google;
pub mod openai;
pub mod stable_diffusion;

pub use google::GoogleAdapter;
pub use openai::OpenAiAdapter;
pub use stable_diffusion::StableDiffusionAdapter;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::traits::AdapterDispatch;
use shared::errors::truncate_excerpt;
use shared::{AttemptFailure, ImageData, ProviderDescriptor, ProviderFamily, RenderParams};

/// Capability shared by all concrete adapters
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn family(&self) -> ProviderFamily;

    async fn generate(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        params: &RenderParams,
    ) -> Result<ImageData, AttemptFailure>;
}

/// Validation shared across all variants, executed before any network
/// call. Every enabled descriptor must carry credential, endpoint, and
/// model.
pub fn preflight(descriptor: &ProviderDescriptor) -> Result<(), AttemptFailure> {
    let mut missing = Vec::new();
    if descriptor.credential.trim().is_empty() {
        missing.push("credential");
    }
    if descriptor.endpoint.trim().is_empty() {
        missing.push("endpoint");
    }
    if descriptor.model.trim().is_empty() {
        missing.push("model");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AttemptFailure::InvalidProviderConfig {
            missing: missing.join(", "),
        })
    }
}

/// Map a non-success HTTP status to a typed failure.
pub(crate) fn failure_from_status(status: StatusCode, body: &str) -> AttemptFailure {
    let excerpt = truncate_excerpt(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AttemptFailure::Auth {
            message: format!("HTTP {}: {excerpt}", status.as_u16()),
        },
        _ => AttemptFailure::Transport {
            message: format!("HTTP {}: {excerpt}", status.as_u16()),
        },
    }
}

pub(crate) fn failure_from_send(error: reqwest::Error) -> AttemptFailure {
    AttemptFailure::Transport {
        message: error.to_string(),
    }
}

/// A well-formed response that carried no usable image payload.
pub(crate) fn refusal(context: &str, body: &serde_json::Value) -> AttemptFailure {
    AttemptFailure::ModelRefused {
        message: format!("{context}: {}", truncate_excerpt(&body.to_string())),
    }
}

pub(crate) fn decode_b64(data: &str) -> Result<Vec<u8>, AttemptFailure> {
    use base64::{engine::general_purpose, Engine as _};
    general_purpose::STANDARD
        .decode(data)
        .map_err(|e| AttemptFailure::ModelRefused {
            message: format!("undecodable image payload: {e}"),
        })
}

/// Production dispatch: pre-flight validation, then the adapter matching
/// the descriptor's family. Adding a backend means adding one adapter
/// and one match arm here.
pub struct RealAdapterDispatch {
    openai: OpenAiAdapter,
    stable_diffusion: StableDiffusionAdapter,
    google: GoogleAdapter,
}

impl RealAdapterDispatch {
    pub fn new() -> Self {
        Self {
            openai: OpenAiAdapter::new(),
            stable_diffusion: StableDiffusionAdapter::new(),
            google: GoogleAdapter::new(),
        }
    }
}

impl Default for RealAdapterDispatch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdapterDispatch for RealAdapterDispatch {
    async fn generate(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        params: &RenderParams,
    ) -> Result<ImageData, AttemptFailure> {
        preflight(descriptor)?;

        match descriptor.family {
            ProviderFamily::OpenAi => self.openai.generate(descriptor, prompt, params).await,
            ProviderFamily::StableDiffusion => {
                self.stable_diffusion
                    .generate(descriptor, prompt, params)
                    .await
            }
            ProviderFamily::Google => self.google.generate(descriptor, prompt, params).await,
        }
    }
}
