//! Boot sequence: configuration, dependencies, scheduler, and API serving.

use std::net::SocketAddr;
use std::sync::Arc;

use healthtrack_api::{ApiServer, MonitorHandles};
use healthtrack_config::AppConfig;
use healthtrack_core::service::{HealthProbe, MonitorWorkflow};
use healthtrack_data::MonitorStore;
use healthtrack_events::EventBus;
use healthtrack_probe::HttpProbe;
use healthtrack_telemetry::{LogFormat, LoggingConfig, Metrics, build_sha};
use tracing::info;

use crate::alerts::AlertDispatcher;
use crate::error::{AppError, AppResult};
use crate::orchestrator::CheckScheduler;

/// Dependencies required to bootstrap the HealthTrack application.
pub(crate) struct BootstrapDependencies {
    config: AppConfig,
    store: MonitorStore,
    events: EventBus,
    telemetry: Metrics,
    probe: Arc<dyn HealthProbe>,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary
    /// entrypoint.
    pub(crate) async fn from_env() -> AppResult<Self> {
        let config = healthtrack_config::load_from_env()
            .map_err(|err| AppError::config("config.load", err))?;

        let store = MonitorStore::connect(&config.database_url)
            .await
            .map_err(|err| AppError::data("store.connect", err))?;

        let events = EventBus::new();
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        let probe: Arc<dyn HealthProbe> =
            Arc::new(HttpProbe::new().map_err(|err| AppError::probe("probe.new", err))?);

        Ok(Self {
            config,
            store,
            events,
            telemetry,
            probe,
        })
    }
}

/// Entry point for the HealthTrack application boot sequence.
///
/// # Errors
///
/// Returns an error if dependency construction or application startup fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env().await?;
    Box::pin(run_app_with(dependencies)).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify
/// testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        store,
        events,
        telemetry,
        probe,
    } = dependencies;

    let format = if config.telemetry.json {
        LogFormat::Json
    } else {
        LogFormat::infer()
    };
    healthtrack_telemetry::init_logging(&LoggingConfig {
        level: &config.telemetry.level,
        format,
        build_sha: build_sha(),
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!(instance = %config.instance_name, "HealthTrack application bootstrap starting");

    let alerts = AlertDispatcher::from_config(&config.alert, events.clone(), telemetry.clone())?;
    if alerts.is_none() {
        info!("alert webhook not configured; alerting disabled");
    }

    let scheduler = CheckScheduler::new(
        store.clone(),
        probe,
        events.clone(),
        telemetry.clone(),
        alerts,
    );
    let rehydrated = scheduler.start_from_store().await?;
    info!(services = rehydrated, "check scheduler ready");

    let workflow: Arc<dyn MonitorWorkflow> = Arc::new(scheduler.clone());
    let handles = MonitorHandles::new(workflow);

    let api = ApiServer::new(
        store,
        events,
        Some(handles),
        telemetry,
        config.apdex_threshold_ms,
    )
    .map_err(|err| AppError::api_server("api_server.new", err))?;

    let addr = SocketAddr::new(config.bind_addr, config.http_port);
    info!(addr = %addr, "Launching API listener");

    let serve_result = api.serve(addr).await;

    scheduler.shutdown();
    serve_result.map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}
