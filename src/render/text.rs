//! Plain-text rendering for terminals.

use std::fmt::Write;

use super::markers;
use crate::dashboard::{DashboardState, LoadState, PredictionOutcome};

/// Render the dashboard state as a text report
pub fn render_text(state: &DashboardState) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = write_report(&mut out, state);
    out
}

fn write_report(out: &mut String, state: &DashboardState) -> std::fmt::Result {
    writeln!(out, "AIDSCRO Dashboard")?;
    writeln!(out, "=================")?;

    if let Some(error) = state.error() {
        writeln!(out)?;
        writeln!(out, "[error] {}", error)?;
    }

    if let Some(importance) = state.feature_importance.loaded() {
        writeln!(out)?;
        writeln!(out, "Feature importance:")?;
        for (feature, weight) in importance.entries() {
            writeln!(out, "  {}: {}", feature, weight)?;
        }
    } else if state.feature_importance.is_loading() {
        writeln!(out)?;
        writeln!(out, "Feature importance: loading...")?;
    }

    match state.outcome() {
        Some(PredictionOutcome::Scalar(prediction)) => {
            writeln!(out)?;
            writeln!(out, "Predicted duration: {}", prediction.predicted)?;
        }
        Some(PredictionOutcome::Hotspots(hotspots)) => {
            writeln!(out)?;
            writeln!(out, "Predictions: {} location(s)", hotspots.len())?;
        }
        None => {}
    }

    let markers = markers(state);
    writeln!(out)?;
    writeln!(
        out,
        "Map center: [{}, {}] (zoom {})",
        state.map.center[0], state.map.center[1], state.map.zoom
    )?;
    for marker in &markers {
        writeln!(
            out,
            "  * [{}, {}] {}",
            marker.position[0], marker.position[1], marker.popup
        )?;
    }

    if let LoadState::Loaded(strategies) = &state.strategies {
        writeln!(out)?;
        writeln!(out, "Optimization strategies:")?;
        if strategies.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for strategy in strategies {
            writeln!(out, "  - {}", strategy)?;
        }
    }

    if let Some(updated) = state.updated_at {
        writeln!(out)?;
        writeln!(out, "Updated: {}", updated.format("%H:%M:%S"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardError, Panel};
    use crate::service::{FeatureImportance, Hotspot, Prediction};

    #[test]
    fn test_renders_importance_in_order() {
        let mut state = DashboardState::default();
        state.feature_importance = LoadState::Loaded(FeatureImportance::new(vec![
            ("month".to_string(), 0.2),
            ("hour".to_string(), 0.8),
        ]));

        let text = render_text(&state);
        let month = text.find("  month: 0.2").unwrap();
        let hour = text.find("  hour: 0.8").unwrap();
        assert!(month < hour);
    }

    #[test]
    fn test_renders_error_without_list() {
        let mut state = DashboardState::default();
        state.feature_importance = LoadState::Failed;
        state.panel = Panel::Error(DashboardError::AuxiliaryFetch);

        let text = render_text(&state);
        assert!(text.contains("[error] Could not load dashboard data"));
        assert!(!text.contains("Feature importance"));
    }

    #[test]
    fn test_renders_scalar_result() {
        let mut state = DashboardState::default();
        state.panel = Panel::Outcome(PredictionOutcome::Scalar(Prediction { predicted: 27.456 }));

        assert!(render_text(&state).contains("Predicted duration: 27.456\n"));
    }

    #[test]
    fn test_renders_markers() {
        let mut state = DashboardState::default();
        state.map.center = [52.5, 13.4];
        state.panel = Panel::Outcome(PredictionOutcome::Hotspots(vec![Hotspot {
            lat: 52.5,
            lon: 13.4,
            jam_factor: 3.0,
        }]));

        let text = render_text(&state);
        assert!(text.contains("Map center: [52.5, 13.4] (zoom 13)"));
        assert!(text.contains("  * [52.5, 13.4] Jam Factor: 3"));
    }
}
