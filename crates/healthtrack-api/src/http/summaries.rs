//! Metrics summary and fleet overview handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path as AxumPath, State},
};
use chrono::{DateTime, Duration, Utc};
use healthtrack_api_models::{MetricsSummaryView, OverviewResponse};
use healthtrack_core::model::{MetricsSummary, Service};
use healthtrack_core::{HealthState, METRICS_WINDOW, classify, summarize};
use tracing::error;
use uuid::Uuid;

use crate::http::errors::ApiError;
use crate::http::services::fetch_service;
use crate::state::ApiState;

pub(crate) async fn service_metrics(
    State(state): State<Arc<ApiState>>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MetricsSummaryView>, ApiError> {
    let service = fetch_service(&state, id).await?;
    let summary = compute_summary(&state, &service, Utc::now())
        .await?
        .ok_or_else(|| ApiError::no_data("no checks recorded yet for this service"))?;
    Ok(Json(MetricsSummaryView::from(summary)))
}

pub(crate) async fn overview(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let services = state.store.list_services().await.map_err(|err| {
        error!(error = %err, "failed to list services for overview");
        ApiError::internal("failed to build overview")
    })?;

    let now = Utc::now();
    let mut healthy = 0u64;
    let mut degraded = 0u64;
    let mut no_data = 0u64;
    for service in &services {
        match compute_summary(&state, service, now).await? {
            Some(summary) if classify(&summary) == HealthState::Healthy => healthy += 1,
            Some(_) => degraded += 1,
            None => no_data += 1,
        }
    }

    Ok(Json(OverviewResponse {
        services_total: services.len() as u64,
        healthy,
        degraded,
        no_data,
    }))
}

async fn compute_summary(
    state: &ApiState,
    service: &Service,
    now: DateTime<Utc>,
) -> Result<Option<MetricsSummary>, ApiError> {
    let window = Duration::from_std(METRICS_WINDOW).map_err(|err| {
        error!(error = %err, "metrics window out of range");
        ApiError::internal("failed to compute metrics window")
    })?;
    let checks = state
        .store
        .checks_since(service.id, now - window)
        .await
        .map_err(|err| {
            error!(error = %err, service_id = %service.id, "failed to load check window");
            ApiError::internal("failed to load check window")
        })?;
    Ok(summarize(service, &checks, now, state.apdex_threshold_ms))
}
