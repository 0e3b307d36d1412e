//! Dashboard View
//!
//! Owns a [`DashboardState`] and a handle to the prediction service, and
//! turns events (mount, field edit, submit, unmount) into state changes.
//!
//! Every network call is split in three phases so a host that shares the view
//! behind a lock never holds the lock across an await:
//!
//! 1. `begin_*` snapshots the request and marks it outstanding
//! 2. [`PendingRequest::run`] performs the call, racing the view's lifecycle
//! 3. [`DashboardView::finish`] applies the reply, unless the view is gone or
//!    the reply is stale
//!
//! [`DashboardView::mount`] and [`DashboardView::submit`] chain the phases for
//! owners that hold the view exclusively.

use std::sync::Arc;

use super::lifecycle::CancelToken;
use super::state::{DashboardState, LoadState, MapView, PredictionOutcome, SubmitKind};
use super::DashboardError;
use crate::service::{
    CityRequest, FeatureImportance, PredictionRequest, PredictionService, ServiceError,
};

/// Result of settling a request against the view
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The reply was applied to the view
    Completed,
    /// The call failed; the view shows the error banner
    Failed(DashboardError),
    /// Another user action is still outstanding; nothing was sent
    Busy,
    /// The view was unmounted or the reply was superseded; state untouched
    Discarded,
}

/// Why a request could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    Busy,
    Unmounted,
}

/// Request snapshot taken when an event starts
#[derive(Debug, Clone)]
enum Call {
    FeatureImportance,
    Strategies,
    Predict(PredictionRequest),
    PredictCity(CityRequest),
}

#[derive(Debug)]
enum Reply {
    FeatureImportance(Result<FeatureImportance, ServiceError>),
    Strategies(Result<Vec<String>, ServiceError>),
    Prediction(Result<PredictionOutcome, ServiceError>),
    Cancelled,
}

/// A request that has been started but not yet sent
#[derive(Debug)]
pub struct PendingRequest {
    ticket: u64,
    call: Call,
    token: CancelToken,
}

/// A finished request waiting to be applied with [`DashboardView::finish`]
#[derive(Debug)]
pub struct Completed {
    ticket: u64,
    reply: Reply,
}

impl PendingRequest {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Perform the call. Resolves early if the view unmounts meanwhile.
    pub async fn run(self, service: &dyn PredictionService) -> Completed {
        let PendingRequest {
            ticket,
            call,
            token,
        } = self;

        let reply = tokio::select! {
            biased;
            _ = token.cancelled() => Reply::Cancelled,
            reply = dispatch(service, call) => reply,
        };

        Completed { ticket, reply }
    }
}

async fn dispatch(service: &dyn PredictionService, call: Call) -> Reply {
    match call {
        Call::FeatureImportance => Reply::FeatureImportance(service.feature_importance().await),
        Call::Strategies => Reply::Strategies(service.optimization_strategies().await),
        Call::Predict(request) => Reply::Prediction(
            service
                .predict(&request)
                .await
                .map(PredictionOutcome::Scalar),
        ),
        Call::PredictCity(request) => Reply::Prediction(
            service
                .predict_city(&request)
                .await
                .map(PredictionOutcome::Hotspots),
        ),
    }
}

/// One dashboard view instance
pub struct DashboardView {
    service: Arc<dyn PredictionService>,
    state: DashboardState,
    lifecycle: CancelToken,
    mounted: bool,
    next_ticket: u64,
    /// Ticket of the initial load, while outstanding
    loading: Option<u64>,
    /// Ticket of the outstanding user action
    in_flight: Option<u64>,
}

impl DashboardView {
    /// Create an unmounted view
    pub fn new(service: Arc<dyn PredictionService>, map: MapView) -> Self {
        Self {
            service,
            state: DashboardState::new(map),
            lifecycle: CancelToken::new(),
            mounted: false,
            next_ticket: 0,
            loading: None,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Shared handle to the service, for running a [`PendingRequest`] unlocked
    pub fn service(&self) -> Arc<dyn PredictionService> {
        Arc::clone(&self.service)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_unmounted(&self) -> bool {
        self.lifecycle.is_cancelled()
    }

    /// Field edit: updates the form record only
    pub fn edit(&mut self, edit: super::FieldEdit) {
        tracing::trace!(field = edit.name(), "Field edited");
        self.state.apply_edit(edit);
    }

    /// Start the initial load. `None` if the view was already mounted or is gone.
    pub fn begin_mount(&mut self) -> Option<PendingRequest> {
        if self.mounted || self.is_unmounted() {
            return None;
        }
        self.mounted = true;
        self.state.feature_importance = LoadState::Loading;

        let pending = self.pending(Call::FeatureImportance);
        self.loading = Some(pending.ticket);
        Some(pending)
    }

    /// Start a user action. Refused while another one is outstanding.
    pub fn begin_submit(&mut self, kind: SubmitKind) -> Result<PendingRequest, Rejected> {
        if self.is_unmounted() {
            return Err(Rejected::Unmounted);
        }
        if self.in_flight.is_some() {
            tracing::debug!(?kind, "Submit ignored, request outstanding");
            return Err(Rejected::Busy);
        }

        let call = match kind {
            SubmitKind::Tabular => Call::Predict(self.state.form.clone()),
            SubmitKind::City => Call::PredictCity(self.state.city.clone()),
            SubmitKind::Strategies => {
                self.state.strategies = LoadState::Loading;
                Call::Strategies
            }
        };

        let pending = self.pending(call);
        self.in_flight = Some(pending.ticket);
        self.state.pending = Some(kind);
        Ok(pending)
    }

    /// Apply a finished request
    pub fn finish(&mut self, completed: Completed) -> SubmitOutcome {
        let Completed { ticket, reply } = completed;

        if self.is_unmounted() {
            tracing::debug!(ticket, "Reply arrived after unmount, discarded");
            return SubmitOutcome::Discarded;
        }

        if self.loading == Some(ticket) {
            self.loading = None;
        } else if self.in_flight == Some(ticket) {
            self.in_flight = None;
            self.state.pending = None;
        } else {
            tracing::debug!(ticket, "Stale reply discarded");
            return SubmitOutcome::Discarded;
        }

        match reply {
            Reply::Cancelled => SubmitOutcome::Discarded,

            Reply::FeatureImportance(Ok(importance)) => {
                tracing::info!(features = importance.len(), "Feature importance loaded");
                self.state.feature_importance = LoadState::Loaded(importance);
                SubmitOutcome::Completed
            }
            Reply::FeatureImportance(Err(e)) => {
                tracing::warn!(error = %e, "Failed to fetch feature importance");
                self.state.feature_importance = LoadState::Failed;
                self.fail(DashboardError::AuxiliaryFetch)
            }

            Reply::Strategies(Ok(strategies)) => {
                tracing::info!(count = strategies.len(), "Optimization strategies loaded");
                self.state.strategies = LoadState::Loaded(strategies);
                SubmitOutcome::Completed
            }
            Reply::Strategies(Err(e)) => {
                tracing::warn!(error = %e, "Failed to fetch optimization strategies");
                self.state.strategies = LoadState::Failed;
                self.fail(DashboardError::AuxiliaryFetch)
            }

            Reply::Prediction(Ok(outcome)) => {
                tracing::info!(?outcome, "Prediction received");
                self.state.show_outcome(outcome);
                SubmitOutcome::Completed
            }
            Reply::Prediction(Err(e)) => {
                tracing::warn!(error = %e, "Prediction request failed");
                self.fail(DashboardError::Prediction)
            }
        }
    }

    /// Initial load. Issues the auxiliary fetch at most once per view.
    pub async fn mount(&mut self) -> Option<SubmitOutcome> {
        let pending = self.begin_mount()?;
        let service = self.service();
        let completed = pending.run(&*service).await;
        Some(self.finish(completed))
    }

    /// Submit a user action and apply its reply
    pub async fn submit(&mut self, kind: SubmitKind) -> SubmitOutcome {
        let pending = match self.begin_submit(kind) {
            Ok(pending) => pending,
            Err(Rejected::Busy) => return SubmitOutcome::Busy,
            Err(Rejected::Unmounted) => return SubmitOutcome::Discarded,
        };
        let service = self.service();
        let completed = pending.run(&*service).await;
        self.finish(completed)
    }

    /// Fetch optimisation strategies on demand
    pub async fn load_strategies(&mut self) -> SubmitOutcome {
        self.submit(SubmitKind::Strategies).await
    }

    /// Tear the view down. Outstanding requests resolve as discarded.
    pub fn unmount(&mut self) {
        if !self.is_unmounted() {
            tracing::debug!("Dashboard view unmounted");
            self.lifecycle.cancel();
        }
    }

    fn pending(&mut self, call: Call) -> PendingRequest {
        self.next_ticket += 1;
        PendingRequest {
            ticket: self.next_ticket,
            call,
            token: self.lifecycle.clone(),
        }
    }

    fn fail(&mut self, error: DashboardError) -> SubmitOutcome {
        self.state.show_error(error.clone());
        SubmitOutcome::Failed(error)
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.unmount();
    }
}
