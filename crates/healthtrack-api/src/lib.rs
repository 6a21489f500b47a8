//! HTTP API for the HealthTrack platform: service CRUD, check history,
//! metrics summaries, the fleet overview, SSE events, and diagnostics.

use std::sync::Arc;

use healthtrack_core::service::MonitorWorkflow;

pub mod http;
mod state;

pub use http::router::ApiServer;

/// Handle bundle connecting the API to the check scheduler.
#[derive(Clone)]
pub struct MonitorHandles {
    workflow: Arc<dyn MonitorWorkflow>,
}

impl MonitorHandles {
    /// Wrap a scheduler workflow for use by the API handlers.
    #[must_use]
    pub fn new(workflow: Arc<dyn MonitorWorkflow>) -> Self {
        Self { workflow }
    }

    /// Access the scheduler workflow façade.
    #[must_use]
    pub fn workflow(&self) -> &Arc<dyn MonitorWorkflow> {
        &self.workflow
    }
}
