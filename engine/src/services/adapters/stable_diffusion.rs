//! Stable Diffusion WebUI adapter (txt2img API)

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{decode_b64, failure_from_send, failure_from_status, refusal, ProviderAdapter};
use shared::{AttemptFailure, ImageData, ProviderDescriptor, ProviderFamily, RenderParams};

pub struct StableDiffusionAdapter {
    client: Client,
}

impl StableDiffusionAdapter {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for StableDiffusionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Txt2ImgRequest {
    prompt: String,
    negative_prompt: String,
    seed: i64,
    styles: Vec<String>,
    width: u32,
    height: u32,
    steps: u32,
    cfg_scale: f32,
    sampler_name: String,
    batch_size: usize,
    override_settings: OverrideSettings,
}

#[derive(Serialize)]
struct OverrideSettings {
    sd_model_checkpoint: String,
}

#[async_trait]
impl ProviderAdapter for StableDiffusionAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::StableDiffusion
    }

    async fn generate(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        params: &RenderParams,
    ) -> Result<ImageData, AttemptFailure> {
        let url = format!(
            "{}/sdapi/v1/txt2img",
            descriptor.endpoint.trim_end_matches('/')
        );

        let (width, height) = parse_size(params.size.as_deref()).unwrap_or((512, 512));

        let body = Txt2ImgRequest {
            prompt: prompt.to_string(),
            negative_prompt: params.negative_prompt.clone().unwrap_or_default(),
            seed: -1,
            styles: params.style.clone().map(|s| vec![s]).unwrap_or_default(),
            width,
            height,
            steps: 25,
            cfg_scale: 7.0,
            sampler_name: "Euler a".to_string(),
            batch_size: 1,
            override_settings: OverrideSettings {
                sd_model_checkpoint: descriptor.model.clone(),
            },
        };

        let response = self
            .client
            .post(&url)
            // WebUI instances deployed behind an auth proxy expect a token
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

        // Response shape: { "images": [ "base64..." ], "parameters": {...}, "info": "..." }
        let b64 = json
            .get("images")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|v| v.as_str())
            .ok_or_else(|| refusal("response missing images[0]", &json))?;

        Ok(ImageData {
            format: "png".to_string(),
            bytes: decode_b64(b64)?,
        })
    }
}

fn parse_size(size: Option<&str>) -> Option<(u32, u32)> {
    let (w, h) = size?.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}
