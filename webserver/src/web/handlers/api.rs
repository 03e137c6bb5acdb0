//! REST API handlers
//!
//! HTTP endpoints for generation, provider operations, and admin
//! configuration

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::services::prompt_builder;
use crate::state::AppState;
use crate::traits::ImageStore;
use engine::traits::ConfigStore;
use shared::{
    AdminConfig, CancelFlag, GenerationOutcome, GenerationRequest, RenderParams,
    TerminalFailure,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub size: Option<String>,
    pub style: Option<String>,
    #[serde(default)]
    pub exclude_providers: Vec<String>,
}

/// Generate an image - POST /api/generate
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> (StatusCode, Json<Value>) {
    if request.prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "error": "prompt must not be empty" })),
        );
    }

    let generation_request = GenerationRequest {
        prompt: prompt_builder::build_prompt(&request.prompt, request.style.as_deref()),
        params: RenderParams {
            size: request.size,
            style: request.style,
            negative_prompt: Some(prompt_builder::DEFAULT_NEGATIVE_PROMPT.to_string()),
        },
        exclude_providers: request.exclude_providers.into_iter().collect(),
    };

    let outcome = match state
        .engine
        .generate(&generation_request, &CancelFlag::new())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "generation call failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": e.to_string() })),
            );
        }
    };

    match outcome {
        GenerationOutcome::Success {
            image,
            provider_id,
            trace,
        } => {
            let url = match state.images.store(&image, &request.prompt).await {
                Ok(url) => url,
                Err(e) => {
                    error!(error = %e, "storing generated image failed");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "status": "error", "error": e.to_string() })),
                    );
                }
            };
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "data": {
                        "url": url,
                        "provider_id": provider_id,
                        "trace": trace,
                    }
                })),
            )
        }
        GenerationOutcome::Failure { failure, trace } => {
            let status = match failure {
                TerminalFailure::AllProvidersExhausted { .. } => StatusCode::BAD_GATEWAY,
                TerminalFailure::NoProvidersConfigured | TerminalFailure::Cancelled => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            };
            (
                status,
                Json(json!({
                    "status": "error",
                    "error": failure.to_string(),
                    "failure": failure,
                    "trace": trace,
                })),
            )
        }
    }
}

/// Provider status report - GET /api/providers
pub async fn provider_statuses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, StatusCode> {
    match state.engine.provider_statuses().await {
        Ok(statuses) => Ok(Json(json!({ "status": "ok", "data": statuses }))),
        Err(e) => {
            error!(error = %e, "provider status lookup failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Manual health recovery - POST /api/providers/:id/reset
pub async fn reset_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<Value> {
    state.engine.reset_provider_health(&id).await;
    Json(json!({ "status": "ok", "data": { "reset": id } }))
}

/// Admin provider listing - GET /api/admin/providers
///
/// Credentials are redacted in the listing; the full values only travel
/// inbound on writes.
pub async fn get_admin_providers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, StatusCode> {
    let config = match state.engine.config_store().load().await {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            error!(error = %e, "admin config load failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let providers: Vec<Value> = config
        .providers
        .iter()
        .map(|entry| {
            json!({
                "name": entry.name,
                "family": entry.family,
                "enabled": entry.enabled,
                "credential": entry.to_descriptor().redacted_credential(),
                "endpoint": entry.endpoint,
                "model": entry.model,
                "priority": entry.priority,
            })
        })
        .collect();

    Ok(Json(json!({ "status": "ok", "data": { "providers": providers } })))
}

/// Replace the admin provider configuration - PUT /api/admin/providers
pub async fn put_admin_providers(
    State(state): State<Arc<AppState>>,
    Json(mut config): Json<AdminConfig>,
) -> Result<Json<Value>, StatusCode> {
    config.normalize();
    match state.engine.config_store().save(&config).await {
        Ok(()) => Ok(Json(json!({
            "status": "ok",
            "data": { "providers": config.providers.len() }
        }))),
        Err(e) => {
            error!(error = %e, "admin config save failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Liveness and uptime - GET /api/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "data": {
            "server_status": "running",
            "uptime_seconds": state.started_at.elapsed().as_secs(),
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
}
