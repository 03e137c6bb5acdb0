//! Environment-supplied provider credential
//!
//! The always-present default provider comes from environment variables
//! (optionally loaded from a `.env` file). It ranks ahead of every admin
//! entry and is immutable for the process lifetime.

use shared::{ProviderDescriptor, ProviderFamily, ProviderOrigin, ENVIRONMENT_PRIORITY};

pub const ENV_CREDENTIAL_VAR: &str = "OPENAI_API_KEY";
pub const ENV_ENDPOINT_VAR: &str = "IMAGE_ENDPOINT";
pub const ENV_MODEL_VAR: &str = "IMAGE_MODEL";

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "dall-e-3";

/// Environment descriptor id: derived from origin + backend name
pub const ENV_DESCRIPTOR_ID: &str = "env-openai";

pub struct EnvProviderSource;

impl EnvProviderSource {
    /// Read the environment descriptor, if a credential is present.
    ///
    /// A blank or missing key means no environment provider; the system
    /// can still run purely on admin-configured entries.
    pub fn load() -> Option<ProviderDescriptor> {
        // Safe to call repeatedly; set variables take precedence over .env
        let _ = dotenvy::dotenv();

        let credential = std::env::var(ENV_CREDENTIAL_VAR).ok()?;
        if credential.trim().is_empty() {
            return None;
        }

        let endpoint =
            std::env::var(ENV_ENDPOINT_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var(ENV_MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Some(Self::descriptor(credential, endpoint, model))
    }

    /// Build the environment descriptor from explicit parts.
    pub fn descriptor(credential: String, endpoint: String, model: String) -> ProviderDescriptor {
        ProviderDescriptor {
            id: ENV_DESCRIPTOR_ID.to_string(),
            display_name: "OpenAI (environment)".to_string(),
            family: ProviderFamily::OpenAi,
            origin: ProviderOrigin::Environment,
            credential,
            endpoint,
            model,
            enabled: true,
            priority: ENVIRONMENT_PRIORITY,
        }
    }
}
