//! Dashboard Routes
//!
//! - GET / - Rendered dashboard page
//! - POST /predict - Tabular prediction form
//! - POST /city - City congestion form
//! - POST /strategies - Load optimisation strategies
//! - GET /api/state - JSON snapshot of the view state

use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};
use std::sync::Arc;

use crate::dashboard::{DashboardState, FieldEdit, SubmitKind, SubmitOutcome};
use crate::render::{render_page, PageContext};
use crate::web::error::WebResult;
use crate::web::state::AppState;

/// Checkbox fields; browsers omit them from the body when unchecked
const CHECKBOXES: &[&str] = &["is_holiday", "is_weekend"];

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let ctx = PageContext {
        service_url: state.service_url.clone(),
    };
    let view = state.view.lock().await;
    Html(render_page(view.state(), &ctx))
}

/// GET /api/state
pub async fn snapshot(State(state): State<Arc<AppState>>) -> Json<DashboardState> {
    let view = state.view.lock().await;
    Json(view.state().clone())
}

/// POST /predict
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> WebResult<Redirect> {
    let mut edits = parse_fields(&fields)?;
    for checkbox in CHECKBOXES {
        if !fields.iter().any(|(name, _)| name == checkbox) {
            edits.push(FieldEdit::parse(checkbox, "")?);
        }
    }

    apply_edits(&state, edits).await;
    log_outcome(SubmitKind::Tabular, state.submit(SubmitKind::Tabular).await);
    Ok(Redirect::to("/"))
}

/// POST /city
pub async fn city(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> WebResult<Redirect> {
    let edits = parse_fields(&fields)?;

    apply_edits(&state, edits).await;
    log_outcome(SubmitKind::City, state.submit(SubmitKind::City).await);
    Ok(Redirect::to("/"))
}

/// POST /strategies
pub async fn strategies(State(state): State<Arc<AppState>>) -> Redirect {
    log_outcome(
        SubmitKind::Strategies,
        state.submit(SubmitKind::Strategies).await,
    );
    Redirect::to("/")
}

fn parse_fields(fields: &[(String, String)]) -> WebResult<Vec<FieldEdit>> {
    let mut edits = Vec::with_capacity(fields.len());
    for (name, raw) in fields {
        if let Some(edit) = FieldEdit::from_input(name, raw)? {
            edits.push(edit);
        }
    }
    Ok(edits)
}

async fn apply_edits(state: &AppState, edits: Vec<FieldEdit>) {
    let mut view = state.view.lock().await;
    for edit in edits {
        view.edit(edit);
    }
}

fn log_outcome(kind: SubmitKind, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Completed => tracing::debug!(?kind, "Submission completed"),
        SubmitOutcome::Failed(e) => tracing::debug!(?kind, error = %e, "Submission failed"),
        SubmitOutcome::Busy => tracing::info!(?kind, "Submission rejected, another is in flight"),
        SubmitOutcome::Discarded => tracing::debug!(?kind, "Submission discarded"),
    }
}
