//! Service registration, listing, deletion, and check-history handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
};
use healthtrack_api_models::{
    CheckListResponse, CheckView, ProblemInvalidParam, ServiceCreateRequest, ServiceListResponse,
    ServiceView,
};
use healthtrack_core::model::{
    MAX_INTERVAL_SECONDS, MAX_TIMEOUT_SECONDS, MIN_INTERVAL_SECONDS, MIN_TIMEOUT_SECONDS,
    NewService, Service,
};
use healthtrack_data::DataError;
use healthtrack_events::Event;
use serde::Deserialize;
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::http::constants::{DEFAULT_CHECKS_LIMIT, MAX_CHECKS_LIMIT};
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn list_services(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ServiceListResponse>, ApiError> {
    let services = state.store.list_services().await.map_err(|err| {
        error!(error = %err, "failed to list services");
        ApiError::internal("failed to list services")
    })?;

    Ok(Json(ServiceListResponse {
        services: services.into_iter().map(ServiceView::from).collect(),
    }))
}

pub(crate) async fn create_service(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ServiceCreateRequest>,
) -> Result<(StatusCode, Json<ServiceView>), ApiError> {
    validate_create(&request)?;

    let new: NewService = request.into();
    let service = state.store.insert_service(&new).await.map_err(|err| match err {
        DataError::DuplicateName { name } => {
            ApiError::conflict(format!("a service named '{name}' already exists"))
        }
        other => {
            error!(error = %other, "failed to insert service");
            ApiError::internal("failed to register service")
        }
    })?;

    info!(service_id = %service.id, service_name = %service.name, "service registered");
    let _ = state.events.publish(Event::ServiceAdded {
        service_id: service.id,
        name: service.name.clone(),
    });

    dispatch_watch(&state, service.clone()).await;

    Ok((StatusCode::CREATED, Json(ServiceView::from(service))))
}

pub(crate) async fn get_service(
    State(state): State<Arc<ApiState>>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<ServiceView>, ApiError> {
    let service = fetch_service(&state, id).await?;
    Ok(Json(ServiceView::from(service)))
}

pub(crate) async fn delete_service(
    State(state): State<Arc<ApiState>>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    // Resolve first so an unknown id is a 404 rather than a silent no-op.
    let service = fetch_service(&state, id).await?;

    if let Some(handles) = &state.monitor
        && let Err(err) = handles.workflow().unwatch(id).await
    {
        warn!(error = %err, service_id = %id, "failed to stop scheduler job");
    }

    state.store.delete_service(id).await.map_err(|err| {
        error!(error = %err, service_id = %id, "failed to delete service");
        ApiError::internal("failed to delete service")
    })?;

    info!(service_id = %id, service_name = %service.name, "service removed");
    let _ = state
        .events
        .publish(Event::ServiceRemoved { service_id: id });
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChecksQuery {
    #[serde(default)]
    limit: Option<i64>,
}

pub(crate) async fn list_checks(
    State(state): State<Arc<ApiState>>,
    AxumPath(id): AxumPath<Uuid>,
    Query(query): Query<ChecksQuery>,
) -> Result<Json<CheckListResponse>, ApiError> {
    fetch_service(&state, id).await?;

    let limit = clamp_checks_limit(query.limit);
    let checks = state.store.recent_checks(id, limit).await.map_err(|err| {
        error!(error = %err, service_id = %id, "failed to load check history");
        ApiError::internal("failed to load check history")
    })?;

    Ok(Json(CheckListResponse {
        checks: checks.into_iter().map(CheckView::from).collect(),
    }))
}

pub(crate) async fn fetch_service(state: &ApiState, id: Uuid) -> Result<Service, ApiError> {
    state
        .store
        .fetch_service(id)
        .await
        .map_err(|err| {
            error!(error = %err, service_id = %id, "failed to load service");
            ApiError::internal("failed to load service")
        })?
        .ok_or_else(|| ApiError::not_found("service not found"))
}

async fn dispatch_watch(state: &ApiState, service: Service) {
    let Some(handles) = &state.monitor else {
        return;
    };
    let service_id = service.id;
    if let Err(err) = handles.workflow().watch(service).await {
        // The service is persisted; a scheduling failure degrades checks
        // without undoing the registration.
        warn!(error = %err, service_id = %service_id, "failed to start scheduler job");
    }
}

pub(crate) fn clamp_checks_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_CHECKS_LIMIT)
        .clamp(1, MAX_CHECKS_LIMIT)
}

fn validate_create(request: &ServiceCreateRequest) -> Result<(), ApiError> {
    let mut invalid = Vec::new();

    if request.name.trim().is_empty() {
        invalid.push(ProblemInvalidParam {
            name: "name".to_string(),
            reason: "must not be empty".to_string(),
        });
    } else if request.name.len() > 200 {
        invalid.push(ProblemInvalidParam {
            name: "name".to_string(),
            reason: "must be at most 200 characters".to_string(),
        });
    }

    match Url::parse(request.url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(_) => invalid.push(ProblemInvalidParam {
            name: "url".to_string(),
            reason: "scheme must be http or https".to_string(),
        }),
        Err(_) => invalid.push(ProblemInvalidParam {
            name: "url".to_string(),
            reason: "must be an absolute URL".to_string(),
        }),
    }

    if !(MIN_INTERVAL_SECONDS..=MAX_INTERVAL_SECONDS).contains(&request.interval_seconds) {
        invalid.push(ProblemInvalidParam {
            name: "interval_seconds".to_string(),
            reason: format!("must be between {MIN_INTERVAL_SECONDS} and {MAX_INTERVAL_SECONDS}"),
        });
    }

    if !(MIN_TIMEOUT_SECONDS..=MAX_TIMEOUT_SECONDS).contains(&request.timeout_seconds) {
        invalid.push(ProblemInvalidParam {
            name: "timeout_seconds".to_string(),
            reason: format!("must be between {MIN_TIMEOUT_SECONDS} and {MAX_TIMEOUT_SECONDS}"),
        });
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation("service payload rejected").with_invalid_params(invalid))
    }
}
