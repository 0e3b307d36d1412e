//! Dashboard View State
//!
//! The explicit, owned state of one dashboard view. Every render reads from
//! here; every event writes here.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::form::FieldEdit;
use super::DashboardError;
use crate::service::{CityRequest, FeatureImportance, Hotspot, Prediction, PredictionRequest};

/// Default map center (lat, lon) before any geolocated result arrives
pub const DEFAULT_MAP_CENTER: [f64; 2] = [51.505, -0.09];

/// Default map zoom level
pub const DEFAULT_MAP_ZOOM: u8 = 13;

/// Progress of a read-only fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed,
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// A successful prediction as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Scalar(Prediction),
    Hotspots(Vec<Hotspot>),
}

/// The result area holds an outcome or an error, never both
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Empty,
    Outcome(PredictionOutcome),
    Error(DashboardError),
}

/// Which user action is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitKind {
    /// Tabular form to `POST /predict`
    Tabular,
    /// City form to `POST /api/predict`
    City,
    /// Optimisation strategies from `GET /optimize`
    Strategies,
}

/// Map viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    /// [lat, lon]
    pub center: [f64; 2],
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_MAP_CENTER,
            zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

/// State of a single dashboard view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    pub form: PredictionRequest,
    pub city: CityRequest,
    pub feature_importance: LoadState<FeatureImportance>,
    pub strategies: LoadState<Vec<String>>,
    pub panel: Panel,
    pub map: MapView,
    /// Outstanding user action; the submit controls are disabled while set
    pub pending: Option<SubmitKind>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn new(map: MapView) -> Self {
        Self {
            form: PredictionRequest::default(),
            city: CityRequest::default(),
            feature_importance: LoadState::Idle,
            strategies: LoadState::Idle,
            panel: Panel::Empty,
            map,
            pending: None,
            updated_at: None,
        }
    }

    /// Apply a field edit. No other field changes.
    pub fn apply_edit(&mut self, edit: FieldEdit) {
        edit.apply(&mut self.form, &mut self.city);
    }

    /// Current outcome, if the panel shows one
    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match &self.panel {
            Panel::Outcome(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Current error banner, if any
    pub fn error(&self) -> Option<&DashboardError> {
        match &self.panel {
            Panel::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Hotspots from the current outcome (empty for scalar results)
    pub fn hotspots(&self) -> &[Hotspot] {
        match self.outcome() {
            Some(PredictionOutcome::Hotspots(hotspots)) => hotspots,
            _ => &[],
        }
    }

    /// Replace the displayed result and clear any error.
    ///
    /// Geolocated results recenter the map on their first point.
    pub(crate) fn show_outcome(&mut self, outcome: PredictionOutcome) {
        if let PredictionOutcome::Hotspots(hotspots) = &outcome {
            if let Some(first) = hotspots.first() {
                self.map.center = [first.lat, first.lon];
            }
        }
        self.panel = Panel::Outcome(outcome);
        self.updated_at = Some(Utc::now());
    }

    /// Clear the displayed result and raise the error banner
    pub(crate) fn show_error(&mut self, error: DashboardError) {
        self.panel = Panel::Error(error);
        self.updated_at = Some(Utc::now());
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(MapView::default())
    }
}
