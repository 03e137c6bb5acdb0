//! Google Imagen adapter (Generative Language predict API)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{decode_b64, failure_from_send, failure_from_status, refusal, ProviderAdapter};
use shared::{AttemptFailure, ImageData, ProviderDescriptor, ProviderFamily, RenderParams};

pub struct GoogleAdapter {
    client: Client,
}

impl GoogleAdapter {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for GoogleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Google
    }

    async fn generate(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        params: &RenderParams,
    ) -> Result<ImageData, AttemptFailure> {
        let url = format!(
            "{}/models/{}:predict",
            descriptor.endpoint.trim_end_matches('/'),
            descriptor.model
        );

        let body = json!({
            "instances": [
                { "prompt": prompt }
            ],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": aspect_ratio(params.size.as_deref()),
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", descriptor.credential.as_str())])
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

        // Response shape: { "predictions": [ { "bytesBase64Encoded": "..." } ] }
        let b64 = json
            .get("predictions")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|entry| entry.get("bytesBase64Encoded"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| refusal("response missing predictions[0].bytesBase64Encoded", &json))?;

        Ok(ImageData {
            format: "png".to_string(),
            bytes: decode_b64(b64)?,
        })
    }
}

fn aspect_ratio(size: Option<&str>) -> &'static str {
    match size {
        Some("1792x1024") | Some("16:9") => "16:9",
        Some("1024x1792") | Some("9:16") => "9:16",
        Some("768x1024") | Some("3:4") => "3:4",
        Some("1024x768") | Some("4:3") => "4:3",
        _ => "1:1",
    }
}
