//! Prober and workflow traits implemented by the engine crates.

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{CheckOutcome, Service};

/// Probe trait implemented by transport adapters (e.g. the HTTP prober).
///
/// Probing is infallible by design: a probe that cannot reach its target is a
/// `down` outcome, not an error.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Execute one health check against the service's target URL.
    async fn probe(&self, service: &Service) -> CheckOutcome;
}

/// Workflow façade exposed to the API layer for scheduler lifecycle control.
#[async_trait]
pub trait MonitorWorkflow: Send + Sync {
    /// Begin periodic checking of a newly registered service.
    async fn watch(&self, service: Service) -> anyhow::Result<()>;

    /// Stop checking a service and discard its job.
    async fn unwatch(&self, service_id: Uuid) -> anyhow::Result<()>;
}
