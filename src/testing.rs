//! In-memory prediction service for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::service::{
    CityRequest, FeatureImportance, Hotspot, Prediction, PredictionRequest, PredictionService,
    ServiceError,
};

/// Scripted [`PredictionService`] that counts calls
pub struct MockService {
    importance: FeatureImportance,
    prediction: f64,
    hotspots: Vec<Hotspot>,
    strategies: Vec<String>,
    fail_importance: bool,
    offline: bool,
    fail_predictions: AtomicBool,
    stalled: bool,
    importance_calls: AtomicUsize,
    predict_calls: AtomicUsize,
    other_calls: AtomicUsize,
    last_request: Mutex<Option<PredictionRequest>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            importance: FeatureImportance::new(vec![
                ("traffic_density".to_string(), 0.52),
                ("hour".to_string(), 0.31),
                ("temperature".to_string(), 0.17),
            ]),
            prediction: 12.0,
            hotspots: Vec::new(),
            strategies: vec![
                "Shift street lighting to adaptive schedules".to_string(),
                "Reroute freight outside peak hours".to_string(),
            ],
            fail_importance: false,
            offline: false,
            fail_predictions: AtomicBool::new(false),
            stalled: false,
            importance_calls: AtomicUsize::new(0),
            predict_calls: AtomicUsize::new(0),
            other_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing_importance(mut self) -> Self {
        self.fail_importance = true;
        self
    }

    /// Status checks fail as well as the auxiliary fetch
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self.fail_importance = true;
        self
    }

    pub fn with_prediction(mut self, value: f64) -> Self {
        self.prediction = value;
        self
    }

    pub fn with_hotspots(mut self, hotspots: Vec<Hotspot>) -> Self {
        self.hotspots = hotspots;
        self
    }

    /// Every call hangs until the caller gives up
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    pub fn set_failing_predictions(&self, failing: bool) {
        self.fail_predictions.store(failing, Ordering::SeqCst);
    }

    pub fn importance_calls(&self) -> usize {
        self.importance_calls.load(Ordering::SeqCst)
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.importance_calls() + self.predict_calls() + self.other_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PredictionRequest> {
        self.last_request.lock().unwrap().clone()
    }

    async fn stall_if_configured(&self) {
        if self.stalled {
            std::future::pending::<()>().await;
        }
    }

    fn prediction_result<T>(&self, value: T) -> Result<T, ServiceError> {
        if self.fail_predictions.load(Ordering::SeqCst) {
            Err(ServiceError::Api {
                status: 500,
                message: "model exploded".to_string(),
            })
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl PredictionService for MockService {
    async fn feature_importance(&self) -> Result<FeatureImportance, ServiceError> {
        self.importance_calls.fetch_add(1, Ordering::SeqCst);
        self.stall_if_configured().await;
        if self.fail_importance {
            return Err(ServiceError::Unavailable);
        }
        Ok(self.importance.clone())
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, ServiceError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.stall_if_configured().await;
        self.prediction_result(Prediction {
            predicted: self.prediction,
        })
    }

    async fn predict_city(&self, _request: &CityRequest) -> Result<Vec<Hotspot>, ServiceError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        self.stall_if_configured().await;
        self.prediction_result(self.hotspots.clone())
    }

    async fn optimization_strategies(&self) -> Result<Vec<String>, ServiceError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        self.stall_if_configured().await;
        Ok(self.strategies.clone())
    }

    async fn status(&self) -> Result<String, ServiceError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(ServiceError::Unavailable);
        }
        Ok("Welcome to AIDSCRO API".to_string())
    }
}
