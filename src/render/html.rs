//! HTML rendering for the browser dashboard.
//!
//! The page is rendered on the server from a state snapshot. Forms post back
//! to the dashboard server; the map is drawn client-side by Leaflet from the
//! embedded center and marker data.

use std::fmt::Write;

use super::{markers, Marker};
use crate::dashboard::{DashboardState, LoadState, PredictionOutcome, SubmitKind};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Values the page needs that are not part of the view state
#[derive(Debug, Clone)]
pub struct PageContext {
    /// Base URL of the prediction service, for the report link
    pub service_url: String,
}

/// Render the full dashboard page
pub fn render_page(state: &DashboardState, ctx: &PageContext) -> String {
    let mut out = String::with_capacity(8 * 1024);
    // Writing to a String cannot fail
    let _ = write_page(&mut out, state, ctx);
    out
}

fn write_page(out: &mut String, state: &DashboardState, ctx: &PageContext) -> std::fmt::Result {
    let markers = markers(state);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>AIDSCRO Dashboard</title>")?;
    writeln!(out, "<link rel=\"stylesheet\" href=\"{}\">", LEAFLET_CSS)?;
    writeln!(out, "<style>{}</style>", STYLE)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>AIDSCRO Dashboard</h1>")?;

    if let Some(error) = state.error() {
        writeln!(
            out,
            "<div class=\"banner error\" role=\"alert\">{}</div>",
            escape(&error.to_string())
        )?;
    }

    writeln!(out, "<div class=\"grid\">")?;
    writeln!(out, "<section class=\"panel\">")?;
    write_prediction_form(out, state)?;
    write_city_form(out, state)?;
    write_result(out, state)?;
    writeln!(out, "</section>")?;

    writeln!(out, "<section class=\"panel\">")?;
    writeln!(out, "<div id=\"map\"></div>")?;
    writeln!(out, "</section>")?;
    writeln!(out, "</div>")?;

    writeln!(out, "<div class=\"grid\">")?;
    write_feature_importance(out, state)?;
    write_strategies(out, state)?;
    writeln!(out, "</div>")?;

    writeln!(
        out,
        "<p class=\"muted\"><a href=\"{}/report\">Full service report</a></p>",
        escape(ctx.service_url.trim_end_matches('/'))
    )?;

    writeln!(out, "<script src=\"{}\"></script>", LEAFLET_JS)?;
    write_map_script(out, state.map.center, state.map.zoom, &markers)?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn disabled(state: &DashboardState) -> &'static str {
    if state.pending.is_some() {
        " disabled"
    } else {
        ""
    }
}

fn write_prediction_form(out: &mut String, state: &DashboardState) -> std::fmt::Result {
    let form = &state.form;

    writeln!(out, "<h2>Trip prediction</h2>")?;
    writeln!(out, "<form method=\"post\" action=\"/predict\">")?;
    text_input(out, "origin", "Origin", &form.origin)?;
    text_input(out, "destination", "Destination", &form.destination)?;
    number_input(out, "distance_km", "Distance (km)", form.distance_km, "any")?;
    number_input(out, "traffic_density", "Traffic density", form.traffic_density, "0.01")?;
    number_input(out, "temperature", "Temperature (°C)", form.temperature, "any")?;
    number_input(out, "hour", "Hour of day", form.hour, "1")?;
    number_input(out, "day_of_week", "Day of week", form.day_of_week, "1")?;
    number_input(out, "month", "Month", form.month, "1")?;
    checkbox(out, "is_holiday", "Holiday", form.is_holiday)?;
    checkbox(out, "is_weekend", "Weekend", form.is_weekend)?;

    let label = if state.pending == Some(SubmitKind::Tabular) {
        "Predicting..."
    } else {
        "Predict"
    };
    writeln!(
        out,
        "<button type=\"submit\"{}>{}</button>",
        disabled(state),
        label
    )?;
    writeln!(out, "</form>")
}

fn write_city_form(out: &mut String, state: &DashboardState) -> std::fmt::Result {
    writeln!(out, "<h2>City congestion</h2>")?;
    writeln!(out, "<form method=\"post\" action=\"/city\">")?;
    text_input(out, "city", "City", &state.city.city)?;

    let label = if state.pending == Some(SubmitKind::City) {
        "Loading..."
    } else {
        "Get Predictions"
    };
    writeln!(
        out,
        "<button type=\"submit\"{}>{}</button>",
        disabled(state),
        label
    )?;
    writeln!(out, "</form>")
}

fn write_result(out: &mut String, state: &DashboardState) -> std::fmt::Result {
    match state.outcome() {
        Some(PredictionOutcome::Scalar(prediction)) => {
            writeln!(out, "<h3>Prediction</h3>")?;
            writeln!(
                out,
                "<p class=\"result\">Predicted duration: {}</p>",
                prediction.predicted
            )?;
        }
        Some(PredictionOutcome::Hotspots(hotspots)) => {
            writeln!(out, "<h3>Predictions:</h3>")?;
            let json = serde_json::to_string_pretty(hotspots).unwrap_or_default();
            writeln!(out, "<pre>{}</pre>", escape(&json))?;
        }
        None => {}
    }
    Ok(())
}

fn write_feature_importance(out: &mut String, state: &DashboardState) -> std::fmt::Result {
    match &state.feature_importance {
        LoadState::Loaded(importance) => {
            writeln!(out, "<section class=\"panel\">")?;
            writeln!(out, "<h2>Feature importance</h2>")?;
            writeln!(out, "<ul id=\"feature-importance\">")?;
            for (feature, weight) in importance.entries() {
                writeln!(
                    out,
                    "<li><span class=\"feature\">{}</span>: <span class=\"weight\">{}</span></li>",
                    escape(feature),
                    weight
                )?;
            }
            writeln!(out, "</ul>")?;
            writeln!(out, "</section>")?;
        }
        LoadState::Loading => {
            writeln!(out, "<section class=\"panel\">")?;
            writeln!(out, "<h2>Feature importance</h2>")?;
            writeln!(out, "<p class=\"muted\">Loading...</p>")?;
            writeln!(out, "</section>")?;
        }
        LoadState::Idle | LoadState::Failed => {}
    }
    Ok(())
}

fn write_strategies(out: &mut String, state: &DashboardState) -> std::fmt::Result {
    writeln!(out, "<section class=\"panel\">")?;
    writeln!(out, "<h2>Optimization strategies</h2>")?;
    writeln!(out, "<form method=\"post\" action=\"/strategies\">")?;
    writeln!(
        out,
        "<button type=\"submit\"{}>Load strategies</button>",
        disabled(state)
    )?;
    writeln!(out, "</form>")?;

    if let LoadState::Loaded(strategies) = &state.strategies {
        writeln!(out, "<ul id=\"strategies\">")?;
        for strategy in strategies {
            writeln!(out, "<li>{}</li>", escape(strategy))?;
        }
        writeln!(out, "</ul>")?;
    }
    writeln!(out, "</section>")
}

fn write_map_script(
    out: &mut String,
    center: [f64; 2],
    zoom: u8,
    markers: &[Marker],
) -> std::fmt::Result {
    let data = serde_json::json!({
        "center": center,
        "zoom": zoom,
        "markers": markers,
    });
    // Keep the JSON from closing the script element early
    let data = data.to_string().replace("</", "<\\/");

    writeln!(out, "<script>")?;
    writeln!(out, "const dashboard = {};", data)?;
    writeln!(
        out,
        "const map = L.map('map').setView(dashboard.center, dashboard.zoom);"
    )?;
    writeln!(
        out,
        "L.tileLayer('{}', {{ attribution: '&copy; OpenStreetMap contributors' }}).addTo(map);",
        TILE_URL
    )?;
    writeln!(
        out,
        "dashboard.markers.forEach(m => L.marker(m.position).addTo(map).bindPopup(m.popup));"
    )?;
    writeln!(out, "</script>")
}

fn text_input(out: &mut String, name: &str, label: &str, value: &str) -> std::fmt::Result {
    writeln!(
        out,
        "<label>{} <input type=\"text\" name=\"{}\" value=\"{}\"></label>",
        label,
        name,
        escape(value)
    )
}

fn number_input<T: std::fmt::Display>(
    out: &mut String,
    name: &str,
    label: &str,
    value: T,
    step: &str,
) -> std::fmt::Result {
    writeln!(
        out,
        "<label>{} <input type=\"number\" name=\"{}\" value=\"{}\" step=\"{}\"></label>",
        label, name, value, step
    )
}

fn checkbox(out: &mut String, name: &str, label: &str, checked: bool) -> std::fmt::Result {
    writeln!(
        out,
        "<label><input type=\"checkbox\" name=\"{}\"{}> {}</label>",
        name,
        if checked { " checked" } else { "" },
        label
    )
}

/// Escape text for HTML element and attribute content
fn escape(input: &str) -> String {
    v_htmlescape::escape(input).to_string()
}

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; background: #121212; color: #eee; margin: 2rem; }
a { color: #2196f3; }
.grid { display: grid; grid-template-columns: 1fr 2fr; gap: 1.5rem; margin-bottom: 1.5rem; }
.panel { background: #1e1e1e; border-radius: 8px; padding: 1rem; }
label { display: block; margin: 0.5rem 0; }
button { background: #2196f3; color: #fff; border: 0; padding: 0.5rem 1rem; border-radius: 4px; }
button[disabled] { opacity: 0.5; }
.banner.error { background: #f50057; padding: 0.75rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
.muted { color: #999; }
#map { height: 400px; }";
