//! Dashboard Web Server
//!
//! Serves the dashboard view to browsers, built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /` - Rendered dashboard page
//! - `POST /predict` - Submit the tabular prediction form
//! - `POST /city` - Submit the city form
//! - `POST /strategies` - Load optimisation strategies
//! - `GET /api/state` - JSON snapshot of the view state
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use aidscro::dashboard::{DashboardView, MapView};
//! use aidscro::service::{ClientConfig, PredictionClient};
//! use aidscro::web::{serve, AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(PredictionClient::new(ClientConfig::default())?);
//!     let view = DashboardView::new(client, MapView::default());
//!     let state = AppState::new(view, "http://localhost:8000");
//!
//!     serve(state, "127.0.0.1:3000").await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod routes;
pub mod state;

pub use error::{WebError, WebResult};
pub use state::{AppState, SharedView};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the dashboard router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let dashboard_routes = Router::new()
        .route("/", get(routes::dashboard::index))
        .route("/predict", post(routes::dashboard::predict))
        .route("/city", post(routes::dashboard::city))
        .route("/strategies", post(routes::dashboard::strategies))
        .route("/api/state", get(routes::dashboard::snapshot));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .merge(dashboard_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Mount the view, then serve until a shutdown signal arrives.
///
/// The initial load runs in the background so the page is reachable while it
/// is outstanding. The view is unmounted on shutdown.
pub async fn serve(state: AppState, addr: &str) -> Result<(), WebError> {
    let mount_state = state.clone();
    tokio::spawn(async move {
        mount_state.mount().await;
    });

    let shutdown_state = state.clone();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("AIDSCRO dashboard listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WebError::Internal(format!("Server error: {}", e)))?;

    shutdown_state.unmount().await;
    tracing::info!("AIDSCRO dashboard shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardView, MapView, SubmitKind, SubmitOutcome};
    use crate::service::{Hotspot, PredictionRequest};
    use crate::testing::MockService;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_state(service: MockService) -> (AppState, Arc<MockService>) {
        let service = Arc::new(service);
        let view = DashboardView::new(service.clone(), MapView::default());
        (AppState::new(view, "http://localhost:8000"), service)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (state, _) = create_test_state(MockService::new());
        let response = build_router(state)
            .oneshot(get_request("/health/live"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_follows_service() {
        let (state, _) = create_test_state(MockService::new());
        let response = build_router(state)
            .oneshot(get_request("/health/ready"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (state, _) = create_test_state(MockService::new().offline());
        let response = build_router(state)
            .oneshot(get_request("/health/ready"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (state, _) = create_test_state(MockService::new());
        let response = build_router(state)
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service_url"], "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_index_after_mount_lists_features() {
        let (state, service) = create_test_state(MockService::new());
        state.mount().await;
        assert_eq!(service.importance_calls(), 1);

        let response = build_router(state).oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = body_string(response).await;
        assert!(page.contains("id=\"feature-importance\""));
        assert!(page.find(">traffic_density<").unwrap() < page.find(">hour<").unwrap());
    }

    #[tokio::test]
    async fn test_index_after_failed_mount_shows_banner() {
        let (state, _) = create_test_state(MockService::new().failing_importance());
        state.mount().await;

        let page = body_string(build_router(state).oneshot(get_request("/")).await.unwrap()).await;
        assert!(page.contains("role=\"alert\""));
        assert!(!page.contains("id=\"feature-importance\""));
    }

    #[tokio::test]
    async fn test_predict_form_submits_and_redirects() {
        let (state, service) = create_test_state(MockService::new().with_prediction(22.0));
        let app = build_router(state.clone());

        let response = app
            .oneshot(form_post(
                "/predict",
                "origin=Docks&destination=Airport&distance_km=14.2&hour=8&is_weekend=on",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let sent = service.last_request().unwrap();
        assert_eq!(sent.origin, "Docks");
        assert_eq!(sent.distance_km, 14.2);
        assert_eq!(sent.hour, 8);
        assert!(sent.is_weekend);
        assert!(!sent.is_holiday);

        let view = state.view.lock().await;
        assert!(view.state().outcome().is_some());
    }

    #[tokio::test]
    async fn test_predict_form_rejects_bad_number() {
        let (state, service) = create_test_state(MockService::new());
        let response = build_router(state)
            .oneshot(form_post("/predict", "hour=late"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(service.predict_calls(), 0);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_predict_form_blank_number_keeps_prior_value() {
        let (state, service) = create_test_state(MockService::new());
        let response = build_router(state)
            .oneshot(form_post(
                "/predict",
                "origin=A&destination=B&distance_km=&hour=8",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(service.predict_calls(), 1);

        let sent = service.last_request().unwrap();
        assert_eq!(sent.origin, "A");
        assert_eq!(sent.hour, 8);
        assert_eq!(sent.distance_km, PredictionRequest::default().distance_km);
    }

    #[tokio::test]
    async fn test_city_form_updates_map() {
        let (state, _) = create_test_state(MockService::new().with_hotspots(vec![Hotspot {
            lat: 52.5,
            lon: 13.4,
            jam_factor: 3.0,
        }]));
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(form_post("/city", "city=Berlin"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let snapshot: serde_json::Value = serde_json::from_str(
            &body_string(app.oneshot(get_request("/api/state")).await.unwrap()).await,
        )
        .unwrap();
        assert_eq!(snapshot["city"]["city"], "Berlin");
        assert_eq!(snapshot["map"]["center"], serde_json::json!([52.5, 13.4]));
        assert_eq!(snapshot["panel"]["kind"], "outcome");
    }

    #[tokio::test]
    async fn test_strategies_route() {
        let (state, _) = create_test_state(MockService::new());
        let app = build_router(state.clone());

        let response = app
            .oneshot(form_post("/strategies", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let view = state.view.lock().await;
        assert_eq!(view.state().strategies.loaded().map(|s| s.len()), Some(2));
    }

    #[tokio::test]
    async fn test_submit_while_outstanding_is_busy() {
        let (state, _) = create_test_state(MockService::new().stalled());

        let first = {
            let state = state.clone();
            tokio::spawn(async move { state.submit(SubmitKind::Tabular).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(state.submit(SubmitKind::City).await, SubmitOutcome::Busy);

        let page = body_string(build_router(state.clone()).oneshot(get_request("/")).await.unwrap())
            .await;
        assert!(page.contains("disabled>Predicting...</button>"));

        state.unmount().await;
        assert_eq!(first.await.unwrap(), SubmitOutcome::Discarded);
    }
}
