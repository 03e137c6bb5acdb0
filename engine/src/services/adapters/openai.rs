//! OpenAI image generation adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{decode_b64, failure_from_send, failure_from_status, refusal, ProviderAdapter};
use shared::{AttemptFailure, ImageData, ProviderDescriptor, ProviderFamily, RenderParams};

pub struct OpenAiAdapter {
    client: Client,
}

impl OpenAiAdapter {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct ImagesRequest {
    model: String,
    prompt: String,
    n: usize,
    size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    // Always b64_json so the payload comes back inline
    response_format: String,
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::OpenAi
    }

    async fn generate(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        params: &RenderParams,
    ) -> Result<ImageData, AttemptFailure> {
        let url = format!(
            "{}/images/generations",
            descriptor.endpoint.trim_end_matches('/')
        );

        let body = ImagesRequest {
            model: descriptor.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: params.size.clone().unwrap_or_else(|| "1024x1024".to_string()),
            // The images API only accepts these two style values
            style: params
                .style
                .as_deref()
                .filter(|s| matches!(*s, "vivid" | "natural"))
                .map(str::to_string),
            response_format: "b64_json".to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", descriptor.credential))
            .json(&body)
            .send()
            .await
            .map_err(failure_from_send)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(failure_from_status(status, &text));
        }

        let json: Value = response.json().await.map_err(|e| {
            AttemptFailure::ModelRefused {
                message: format!("response was not valid JSON: {e}"),
            }
        })?;

        // Response shape: { "created": ..., "data": [ { "b64_json": "..." } ] }
        let b64 = json
            .get("data")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|entry| entry.get("b64_json"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| refusal("response missing data[0].b64_json", &json))?;

        Ok(ImageData {
            format: "png".to_string(),
            bytes: decode_b64(b64)?,
        })
    }
}
