//! The check scheduler: one periodic probe job per registered service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use healthtrack_core::model::Service;
use healthtrack_core::service::{HealthProbe, MonitorWorkflow};
use healthtrack_data::MonitorStore;
use healthtrack_events::{CheckStatus, Event, EventBus};
use healthtrack_telemetry::Metrics;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::alerts::AlertDispatcher;
use crate::error::{AppError, AppResult};

/// Owns the per-service probe jobs. Cloneable; all clones share the same
/// job registry.
#[derive(Clone)]
pub(crate) struct CheckScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    store: MonitorStore,
    probe: Arc<dyn HealthProbe>,
    events: EventBus,
    telemetry: Metrics,
    alerts: Option<AlertDispatcher>,
    jobs: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl CheckScheduler {
    pub(crate) fn new(
        store: MonitorStore,
        probe: Arc<dyn HealthProbe>,
        events: EventBus,
        telemetry: Metrics,
        alerts: Option<AlertDispatcher>,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                store,
                probe,
                events,
                telemetry,
                alerts,
                jobs: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Spawn jobs for every persisted service, returning how many were
    /// rehydrated.
    ///
    /// # Errors
    ///
    /// Returns an error if the service catalog cannot be loaded.
    pub(crate) async fn start_from_store(&self) -> AppResult<usize> {
        let services = self
            .inner
            .store
            .list_services()
            .await
            .map_err(|err| AppError::data("scheduler.start_from_store", err))?;
        let count = services.len();
        for service in services {
            self.spawn_job(service);
        }
        Ok(count)
    }

    /// Abort every job, e.g. during application shutdown.
    pub(crate) fn shutdown(&self) {
        let mut jobs = self.inner.jobs.lock().expect("scheduler job mutex poisoned");
        for (_, handle) in jobs.drain() {
            handle.abort();
        }
        self.inner.telemetry.set_watched_services(0);
        info!("check scheduler stopped");
    }

    fn spawn_job(&self, service: Service) {
        let service_id = service.id;
        let service_name = service.name.clone();
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(run_service_job(inner, service));

        let mut jobs = self.inner.jobs.lock().expect("scheduler job mutex poisoned");
        if let Some(previous) = jobs.insert(service_id, handle) {
            previous.abort();
        }
        self.record_watched(&jobs);
        drop(jobs);
        info!(service_id = %service_id, service_name = %service_name, "check job started");
    }

    fn remove_job(&self, service_id: Uuid) -> bool {
        let mut jobs = self.inner.jobs.lock().expect("scheduler job mutex poisoned");
        let removed = jobs.remove(&service_id);
        self.record_watched(&jobs);
        drop(jobs);
        match removed {
            Some(handle) => {
                handle.abort();
                info!(service_id = %service_id, "check job stopped");
                true
            }
            None => false,
        }
    }

    fn record_watched(&self, jobs: &HashMap<Uuid, JoinHandle<()>>) {
        let count = i64::try_from(jobs.len()).unwrap_or(i64::MAX);
        self.inner.telemetry.set_watched_services(count);
    }
}

#[async_trait]
impl MonitorWorkflow for CheckScheduler {
    async fn watch(&self, service: Service) -> anyhow::Result<()> {
        self.spawn_job(service);
        Ok(())
    }

    async fn unwatch(&self, service_id: Uuid) -> anyhow::Result<()> {
        if !self.remove_job(service_id) {
            warn!(service_id = %service_id, "no check job registered for service");
        }
        Ok(())
    }
}

async fn run_service_job(inner: Arc<SchedulerInner>, service: Service) {
    let period = Duration::from_secs(u64::from(service.interval_seconds.max(1)));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_status: Option<CheckStatus> = None;

    loop {
        ticker.tick().await;
        execute_tick(&inner, &service, &mut last_status).await;
    }
}

/// One scheduler tick: probe, persist, publish, alert. Failures are logged
/// and never terminate the job.
async fn execute_tick(
    inner: &SchedulerInner,
    service: &Service,
    last_status: &mut Option<CheckStatus>,
) {
    let outcome = inner.probe.probe(service).await;
    inner.telemetry.inc_check(outcome.status.as_str());
    if let Some(elapsed_ms) = outcome.response_time_ms {
        inner
            .telemetry
            .observe_probe_latency(Duration::from_secs_f64(elapsed_ms.max(0.0) / 1_000.0));
    }

    if let Err(err) = inner.store.record_check(service.id, &outcome).await {
        inner.telemetry.inc_store_failure();
        warn!(service_id = %service.id, error = %err, "failed to persist check result");
    }

    let _ = inner.events.publish(Event::CheckCompleted {
        service_id: service.id,
        status: outcome.status,
        response_time_ms: outcome.response_time_ms,
    });

    if let Some((from, to)) = status_transition(*last_status, outcome.status) {
        info!(
            service_id = %service.id,
            service_name = %service.name,
            from = from.as_str(),
            to = to.as_str(),
            "service status changed"
        );
        let _ = inner.events.publish(Event::StatusChanged {
            service_id: service.id,
            from,
            to,
        });
    }
    *last_status = Some(outcome.status);

    if let Some(alerts) = &inner.alerts {
        alerts.evaluate(service, &outcome).await;
    }
}

/// A transition is only reported once a previous status exists and differs.
fn status_transition(
    previous: Option<CheckStatus>,
    next: CheckStatus,
) -> Option<(CheckStatus, CheckStatus)> {
    match previous {
        Some(previous) if previous != next => Some((previous, next)),
        _ => None,
    }
}
