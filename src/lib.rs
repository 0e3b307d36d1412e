//! # AIDSCRO Dashboard
//!
//! A thin dashboard for a smart-city prediction service: collect form input,
//! forward it to the service over HTTP, and render the response as text, a
//! list, or map markers.
//!
//! ## Modules
//!
//! - [`service`]: HTTP client and trait for the external prediction service
//! - [`dashboard`]: the dashboard view, its state, and its lifecycle
//! - [`render`]: text and HTML renderings of the view state
//! - [`web`]: browser dashboard server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aidscro::dashboard::{DashboardView, FieldEdit, MapView, SubmitKind};
//! use aidscro::render::render_text;
//! use aidscro::service::{ClientConfig, PredictionClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(PredictionClient::new(ClientConfig::default())?);
//!     let mut view = DashboardView::new(client, MapView::default());
//!
//!     // Initial load: feature importance
//!     view.mount().await;
//!
//!     // Ask for congestion hotspots
//!     view.edit(FieldEdit::City("Berlin".to_string()));
//!     view.submit(SubmitKind::City).await;
//!
//!     println!("{}", render_text(view.state()));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod logging;
pub mod render;
pub mod service;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, DashboardConfig, LoggingConfig, ServiceConfig};

pub use dashboard::{
    DashboardError, DashboardState, DashboardView, FieldEdit, FormError, MapView,
    PredictionOutcome, SubmitKind, SubmitOutcome,
};

pub use service::{
    ClientConfig, FeatureImportance, Hotspot, Prediction, PredictionClient, PredictionRequest,
    PredictionService, ServiceError,
};

pub use web::{build_router, serve, AppState, WebError};
