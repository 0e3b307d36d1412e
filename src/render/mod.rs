//! Rendering
//!
//! Pure functions from [`DashboardState`] to output: plain text for the CLI
//! and an HTML page for the browser dashboard.

mod html;
mod text;

pub use html::{render_page, PageContext};
pub use text::render_text;

use serde::Serialize;

use crate::dashboard::DashboardState;

/// A map marker derived from a geolocated result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// [lat, lon]
    pub position: [f64; 2],
    pub popup: String,
}

/// One marker per hotspot of the current result
pub fn markers(state: &DashboardState) -> Vec<Marker> {
    state
        .hotspots()
        .iter()
        .map(|h| Marker {
            position: [h.lat, h.lon],
            popup: format!("Jam Factor: {}", h.jam_factor),
        })
        .collect()
}
