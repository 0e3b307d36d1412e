//! Dashboard
//!
//! The single view of the application: a prediction form, a city search,
//! the feature-importance list, the result panel, and the map.
//!
//! - [`DashboardView`]: event handling and request lifecycle
//! - [`DashboardState`]: everything a render needs
//! - [`FieldEdit`]: typed form edits

mod form;
mod lifecycle;
mod state;
mod view;

pub use form::{parse_assignments, FieldEdit, FormError, FIELD_NAMES};
pub use lifecycle::CancelToken;
pub use state::{
    DashboardState, LoadState, MapView, Panel, PredictionOutcome, SubmitKind, DEFAULT_MAP_CENTER,
    DEFAULT_MAP_ZOOM,
};
pub use view::{Completed, DashboardView, PendingRequest, Rejected, SubmitOutcome};

use serde::Serialize;
use thiserror::Error;

/// User-facing failures. The messages are static; the cause is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardError {
    #[error("Could not load dashboard data. Please try again later.")]
    AuxiliaryFetch,

    #[error("Prediction request failed. Please try again.")]
    Prediction,
}
