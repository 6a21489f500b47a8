//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    http::{HeaderName, Method, Request, header::CONTENT_TYPE},
    routing::get,
};
use healthtrack_data::MonitorStore;
use healthtrack_events::EventBus;
use healthtrack_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::MonitorHandles;
use crate::http::constants::{HEADER_LAST_EVENT_ID, HEADER_REQUEST_ID};
use crate::http::health::{health, metrics};
use crate::http::services::{
    create_service, delete_service, get_service, list_checks, list_services,
};
use crate::http::sse::stream_events;
use crate::http::summaries::{overview, service_metrics};
use crate::http::telemetry::HttpMetricsLayer;
use crate::state::ApiState;

/// Axum router wrapper that hosts the HealthTrack API services.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct a new API server with shared dependencies wired through
    /// application state.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible to absorb future wiring steps
    /// without breaking callers.
    pub fn new(
        store: MonitorStore,
        events: EventBus,
        monitor: Option<MonitorHandles>,
        telemetry: Metrics,
        apdex_threshold_ms: f64,
    ) -> Result<Self> {
        let state = Arc::new(ApiState::new(
            store,
            events,
            telemetry.clone(),
            monitor,
            apdex_threshold_ms,
        ));

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([
                CONTENT_TYPE,
                HeaderName::from_static(HEADER_REQUEST_ID),
                HeaderName::from_static(HEADER_LAST_EVENT_ID),
            ]);

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );

        let layered = ServiceBuilder::new()
            .layer(healthtrack_telemetry::propagate_request_id_layer())
            .layer(healthtrack_telemetry::set_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Self::build_router()
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Ok(Self { router })
    }

    fn build_router() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route("/v1/services", get(list_services).post(create_service))
            .route(
                "/v1/services/{id}",
                get(get_service).delete(delete_service),
            )
            .route("/v1/services/{id}/checks", get(list_checks))
            .route("/v1/services/{id}/metrics", get(service_metrics))
            .route("/v1/overview", get(overview))
            .route("/v1/events", get(stream_events))
    }

    /// Serve the API using the configured router on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server
    /// terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        tracing::info!("Starting API on {}", addr);
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router.into_make_service()).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::StatusCode;
    use healthtrack_api_models::{
        MetricsSummaryView, OverviewResponse, ProblemDetails, ServiceListResponse, ServiceView,
    };
    use healthtrack_core::model::CheckOutcome;
    use healthtrack_events::CheckStatus;
    use healthtrack_test_support::start_postgres;
    use serde_json::json;
    use tower::ServiceExt;

    async fn request(
        server: &ApiServer,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                builder
                    .body(Body::from(value.to_string()))
                    .expect("request builds")
            }
            None => builder.body(Body::empty()).expect("request builds"),
        };

        let response = server
            .router()
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn service_crud_and_metrics_round_trip() {
        let Ok(database) = start_postgres() else {
            eprintln!("skipping API integration test: no Postgres available");
            return;
        };

        let store = MonitorStore::connect(database.connection_string())
            .await
            .expect("store connects");
        let server = ApiServer::new(
            store.clone(),
            EventBus::with_capacity(64),
            None,
            Metrics::new().expect("registry builds"),
            500.0,
        )
        .expect("server builds");

        // Empty fleet.
        let (status, body) = request(&server, Method::GET, "/v1/services", None).await;
        assert_eq!(status, StatusCode::OK);
        let listing: ServiceListResponse = serde_json::from_slice(&body).expect("listing parses");
        assert!(listing.services.is_empty());

        // Create.
        let payload = json!({
            "name": "api-gateway",
            "url": "https://gateway.internal/health",
            "interval_seconds": 30,
            "timeout_seconds": 5
        });
        let (status, body) =
            request(&server, Method::POST, "/v1/services", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let created: ServiceView = serde_json::from_slice(&body).expect("service parses");
        assert_eq!(created.name, "api-gateway");

        // Duplicate name conflicts.
        let (status, _) = request(&server, Method::POST, "/v1/services", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Validation failures surface invalid params.
        let (status, body) = request(
            &server,
            Method::POST,
            "/v1/services",
            Some(json!({"name": "", "url": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let problem: ProblemDetails = serde_json::from_slice(&body).expect("problem parses");
        assert!(problem.invalid_params.is_some());

        // No checks yet: the metrics endpoint reports the no-data problem.
        let path = format!("/v1/services/{}/metrics", created.id);
        let (status, body) = request(&server, Method::GET, &path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let problem: ProblemDetails = serde_json::from_slice(&body).expect("problem parses");
        assert!(problem.kind.ends_with("/no-data"));

        // Record checks directly and read the summary back.
        store
            .record_check(created.id, &CheckOutcome::responded(CheckStatus::Ok, 80.0))
            .await
            .expect("check persists");
        store
            .record_check(created.id, &CheckOutcome::responded(CheckStatus::Ok, 120.0))
            .await
            .expect("check persists");
        let (status, body) = request(&server, Method::GET, &path, None).await;
        assert_eq!(status, StatusCode::OK);
        let summary: MetricsSummaryView = serde_json::from_slice(&body).expect("summary parses");
        assert_eq!(summary.checks_count, 2);
        assert_eq!(summary.current_status, CheckStatus::Ok);

        // Overview counts one healthy service.
        let (status, body) = request(&server, Method::GET, "/v1/overview", None).await;
        assert_eq!(status, StatusCode::OK);
        let overview: OverviewResponse = serde_json::from_slice(&body).expect("overview parses");
        assert_eq!(overview.services_total, 1);
        assert_eq!(overview.healthy, 1);

        // Check history is exposed newest first.
        let checks_path = format!("/v1/services/{}/checks?limit=1", created.id);
        let (status, body) = request(&server, Method::GET, &checks_path, None).await;
        assert_eq!(status, StatusCode::OK);
        let history: healthtrack_api_models::CheckListResponse =
            serde_json::from_slice(&body).expect("history parses");
        assert_eq!(history.checks.len(), 1);
        assert_eq!(history.checks[0].response_time_ms, Some(120.0));

        // Delete and confirm the 404s.
        let delete_path = format!("/v1/services/{}", created.id);
        let (status, _) = request(&server, Method::DELETE, &delete_path, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = request(&server, Method::DELETE, &delete_path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = request(&server, Method::GET, &path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let problem: ProblemDetails = serde_json::from_slice(&body).expect("problem parses");
        assert!(problem.kind.ends_with("/not-found"));

        // Liveness endpoint reflects a reachable database.
        let (status, _) = request(&server, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);

        // Prometheus exposition includes the HTTP counters this test drove.
        let (status, body) = request(&server, Method::GET, "/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        let exposition = String::from_utf8(body).expect("exposition is UTF-8");
        assert!(exposition.contains("http_requests_total"));
    }
}
