//! Health Routes
//!
//! Health check endpoints for monitoring.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (prediction service reachable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::web::state::AppState;

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// "ok" or "unreachable"
    pub service: String,
    pub service_url: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 if the prediction service answers.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_service(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let service_ok = check_service(&state).await;

    Json(HealthResponse {
        status: if service_ok { "healthy" } else { "degraded" }.to_string(),
        service: if service_ok { "ok" } else { "unreachable" }.to_string(),
        service_url: state.service_url.clone(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_service(state: &AppState) -> bool {
    match state.service.status().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Prediction service health check failed");
            false
        }
    }
}
