//! WebServer binary entry point

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use engine::services::adapters::RealAdapterDispatch;
use engine::services::config_store::FileConfigStore;
use engine::services::env_source::EnvProviderSource;
use engine::services::health::HealthTracker;
use engine::{Engine, EngineSettings};
use webserver::services::DiskImageStore;
use webserver::state::AppState;
use webserver::{WebServerError, WebServerResult};

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "Text-to-image generation service with provider fallback")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Path of the admin provider configuration document
    #[arg(long, default_value = "./data/providers.json")]
    config: PathBuf,

    /// Directory where generated images are stored
    #[arg(long, default_value = "./data/images")]
    images_dir: PathBuf,

    /// Public mount path for stored images
    #[arg(long, default_value = "/images")]
    public_base: String,

    /// Bound on each individual provider attempt, in seconds
    #[arg(long, default_value = "30")]
    attempt_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> WebServerResult<()> {
    let args = Args::parse();
    shared::logging::init_tracing("webserver", Some(&args.log_level));

    let env_descriptor = EnvProviderSource::load();
    match &env_descriptor {
        Some(descriptor) => info!(
            endpoint = %descriptor.endpoint,
            model = %descriptor.model,
            "environment provider configured"
        ),
        None => warn!(
            "no environment credential set; running on admin-configured providers only"
        ),
    }

    let engine = Engine::new(
        env_descriptor,
        FileConfigStore::new(&args.config),
        RealAdapterDispatch::new(),
        Arc::new(HealthTracker::new()),
        EngineSettings {
            attempt_timeout: std::time::Duration::from_secs(args.attempt_timeout),
        },
    );

    tokio::fs::create_dir_all(&args.images_dir).await?;
    let images = Arc::new(DiskImageStore::new(&args.images_dir, &args.public_base));
    let state = Arc::new(AppState::new(engine, images));
    let app = webserver::web::router(state, &args.images_dir);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "webserver listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WebServerError::Startup {
            message: e.to_string(),
        })?;

    info!("webserver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
