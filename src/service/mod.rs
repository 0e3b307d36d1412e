//! Prediction Service
//!
//! The external prediction service is an opaque HTTP collaborator. This
//! module holds the trait the dashboard talks to, its reqwest-backed
//! implementation, and the wire types.
//!
//! # Endpoints
//!
//! - `GET /feature_importance` - feature name to weight
//! - `POST /predict` - tabular prediction
//! - `POST /api/predict` - per-city congestion hotspots
//! - `GET /optimize` - optimisation strategies
//! - `GET /` - service status message

mod client;
mod types;

pub use client::{ClientConfig, PredictionClient, DEFAULT_SERVICE_URL};
pub use types::{
    CityRequest, FeatureImportance, Hotspot, Prediction, PredictionRequest, PREDICTION_KEYS,
};

use async_trait::async_trait;
use thiserror::Error;

/// Operations the dashboard needs from the prediction service
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Fetch feature-importance weights
    async fn feature_importance(&self) -> Result<FeatureImportance, ServiceError>;

    /// Predict from the tabular form fields
    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, ServiceError>;

    /// Predict congestion hotspots for a city
    async fn predict_city(&self, request: &CityRequest) -> Result<Vec<Hotspot>, ServiceError>;

    /// Fetch resource optimisation strategies
    async fn optimization_strategies(&self) -> Result<Vec<String>, ServiceError>;

    /// Service welcome message, used as a reachability check
    async fn status(&self) -> Result<String, ServiceError>;
}

/// Errors that can occur when communicating with the prediction service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Prediction service unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    Decode(String),
}
