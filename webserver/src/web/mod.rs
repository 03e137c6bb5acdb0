//! Router assembly

pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn router(state: Arc<AppState>, images_dir: &Path) -> Router {
    Router::new()
        .route("/api/generate", post(handlers::api::generate))
        .route("/api/providers", get(handlers::api::provider_statuses))
        .route(
            "/api/providers/:id/reset",
            post(handlers::api::reset_provider),
        )
        .route(
            "/api/admin/providers",
            get(handlers::api::get_admin_providers).put(handlers::api::put_admin_providers),
        )
        .route("/api/status", get(handlers::api::get_status))
        .nest_service("/images", ServeDir::new(images_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
