//! Application State
//!
//! Shared state accessible by all handlers.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::dashboard::{
    Completed, DashboardView, PendingRequest, Rejected, SubmitKind, SubmitOutcome,
};
use crate::service::PredictionService;

/// The dashboard view shared between handlers
pub type SharedView = Arc<Mutex<DashboardView>>;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The one dashboard view hosted by this server
    pub view: SharedView,
    /// Prediction service, for health probes
    pub service: Arc<dyn PredictionService>,
    /// Base URL of the prediction service, shown on the page
    pub service_url: String,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(view: DashboardView, service_url: impl Into<String>) -> Self {
        let service = view.service();
        Self {
            view: Arc::new(Mutex::new(view)),
            service,
            service_url: service_url.into(),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Mount the view: run the initial load without holding the lock
    pub async fn mount(&self) -> Option<SubmitOutcome> {
        let pending = self.view.lock().await.begin_mount()?;
        Some(self.settle(pending).await)
    }

    /// Submit a user action without holding the lock across the request
    pub async fn submit(&self, kind: SubmitKind) -> SubmitOutcome {
        let pending = self.view.lock().await.begin_submit(kind);
        match pending {
            Ok(pending) => self.settle(pending).await,
            Err(Rejected::Busy) => SubmitOutcome::Busy,
            Err(Rejected::Unmounted) => SubmitOutcome::Discarded,
        }
    }

    async fn settle(&self, pending: PendingRequest) -> SubmitOutcome {
        let completed: Completed = pending.run(&*self.service).await;
        self.view.lock().await.finish(completed)
    }

    /// Unmount the view; in-flight requests are discarded
    pub async fn unmount(&self) {
        self.view.lock().await.unmount();
    }
}
