//! AIDSCRO Dashboard Server
//!
//! Run with: cargo run --bin aidscro
//!
//! # Configuration
//!
//! Read from `config.toml` in the default locations, then overridden by:
//! - `AIDSCRO_SERVICE_URL`: Prediction service URL (default: http://localhost:8000)
//! - `AIDSCRO_HOST`: Host to bind to (default: 127.0.0.1)
//! - `AIDSCRO_PORT`: Port to listen on (default: 3000)
//! - `AIDSCRO_LOG_LEVEL` / `AIDSCRO_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Full filter override

use aidscro::config::Config;
use aidscro::dashboard::DashboardView;
use aidscro::service::{ClientConfig, PredictionClient};
use aidscro::web::{serve, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    aidscro::logging::init(&config.logging, "tower_http=debug");

    tracing::info!("Starting AIDSCRO dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Prediction service: {}", config.service.base_url);

    let client = Arc::new(PredictionClient::new(ClientConfig::new(
        config.service.base_url.clone(),
    ))?);
    let view = DashboardView::new(client, config.dashboard.map_view());
    let state = AppState::new(view, config.service.base_url.clone());

    serve(state, &config.dashboard.addr()).await?;

    tracing::info!("AIDSCRO dashboard stopped");
    Ok(())
}
