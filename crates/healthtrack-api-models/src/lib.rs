#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared HTTP DTOs for the HealthTrack API, used by the server and the
//! dashboard CLI alike. Wire field names follow the dashboard contract:
//! renaming one here is a breaking API change.

use chrono::{DateTime, Utc};
use healthtrack_core::model::{
    CheckRecord, DEFAULT_INTERVAL_SECONDS, DEFAULT_TIMEOUT_SECONDS, MetricsSummary, NewService,
    Service,
};
use healthtrack_events::CheckStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for registering a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCreateRequest {
    /// Display name; unique across the fleet.
    pub name: String,
    /// Target URL probed on every check.
    pub url: String,
    /// Seconds between checks; defaults to one minute.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u32,
    /// Seconds before a probe is abandoned; defaults to ten seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,
}

const fn default_interval_seconds() -> u32 {
    DEFAULT_INTERVAL_SECONDS
}

const fn default_timeout_seconds() -> u32 {
    DEFAULT_TIMEOUT_SECONDS
}

impl From<ServiceCreateRequest> for NewService {
    fn from(request: ServiceCreateRequest) -> Self {
        Self {
            name: request.name,
            url: request.url,
            interval_seconds: request.interval_seconds,
            timeout_seconds: request.timeout_seconds,
        }
    }
}

/// A registered service as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceView {
    /// Backend-assigned identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Target URL.
    pub url: String,
    /// Seconds between checks.
    pub interval_seconds: u32,
    /// Seconds before a probe is abandoned.
    pub timeout_seconds: u32,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Service> for ServiceView {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            url: service.url,
            interval_seconds: service.interval_seconds,
            timeout_seconds: service.timeout_seconds,
            created_at: service.created_at,
        }
    }
}

/// Envelope for the service listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceListResponse {
    /// Registered services, oldest first.
    pub services: Vec<ServiceView>,
}

/// One persisted check as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckView {
    /// Record identifier.
    pub id: Uuid,
    /// The service the check belongs to.
    pub service_id: Uuid,
    /// When the probe completed.
    pub timestamp: DateTime<Utc>,
    /// Qualitative outcome.
    pub status: CheckStatus,
    /// Observed response time, when the target answered.
    pub response_time_ms: Option<f64>,
    /// Transport error captured for `down` checks.
    pub error: Option<String>,
}

impl From<CheckRecord> for CheckView {
    fn from(record: CheckRecord) -> Self {
        Self {
            id: record.id,
            service_id: record.service_id,
            timestamp: record.timestamp,
            status: record.status,
            response_time_ms: record.response_time_ms,
            error: record.error,
        }
    }
}

/// Envelope for a service's recent checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckListResponse {
    /// Checks, newest first.
    pub checks: Vec<CheckView>,
}

/// Per-service metrics snapshot as returned by the API. Field names match
/// the dashboard contract exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummaryView {
    /// The service the snapshot describes.
    pub service_id: Uuid,
    /// Display name carried along for renderers.
    pub service_name: String,
    /// Status of the most recent check in the window.
    pub current_status: CheckStatus,
    /// Mean response time across checks that produced one.
    pub avg_response_time_ms: f64,
    /// 95th percentile response time.
    pub p95_response_time_ms: f64,
    /// 99th percentile response time.
    pub p99_response_time_ms: f64,
    /// Share of failed checks, in percent.
    pub error_rate_percent: f64,
    /// Share of reachable checks over the window, in percent.
    pub uptime_percent_24h: f64,
    /// Checks per minute over the observed span.
    pub request_rate_rpm: f64,
    /// Checks per second over the observed span.
    pub throughput_rps: f64,
    /// Application Performance Index in [0, 1].
    pub apdex_score: f64,
    /// Number of checks in the window.
    pub checks_count: u64,
    /// Timestamp of the most recent check.
    pub last_check_timestamp: DateTime<Utc>,
}

impl From<MetricsSummary> for MetricsSummaryView {
    fn from(summary: MetricsSummary) -> Self {
        Self {
            service_id: summary.service_id,
            service_name: summary.service_name,
            current_status: summary.current_status,
            avg_response_time_ms: summary.avg_response_time_ms,
            p95_response_time_ms: summary.p95_response_time_ms,
            p99_response_time_ms: summary.p99_response_time_ms,
            error_rate_percent: summary.error_rate_percent,
            uptime_percent_24h: summary.uptime_percent_24h,
            request_rate_rpm: summary.request_rate_rpm,
            throughput_rps: summary.throughput_rps,
            apdex_score: summary.apdex_score,
            checks_count: summary.checks_count,
            last_check_timestamp: summary.last_check_timestamp,
        }
    }
}

impl From<MetricsSummaryView> for MetricsSummary {
    fn from(view: MetricsSummaryView) -> Self {
        Self {
            service_id: view.service_id,
            service_name: view.service_name,
            current_status: view.current_status,
            avg_response_time_ms: view.avg_response_time_ms,
            p95_response_time_ms: view.p95_response_time_ms,
            p99_response_time_ms: view.p99_response_time_ms,
            error_rate_percent: view.error_rate_percent,
            uptime_percent_24h: view.uptime_percent_24h,
            request_rate_rpm: view.request_rate_rpm,
            throughput_rps: view.throughput_rps,
            apdex_score: view.apdex_score,
            checks_count: view.checks_count,
            last_check_timestamp: view.last_check_timestamp,
        }
    }
}

/// Fleet summary for the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewResponse {
    /// Total registered services.
    pub services_total: u64,
    /// Services currently classified healthy.
    pub healthy: u64,
    /// Services tripping any degradation signal.
    pub degraded: u64,
    /// Services with no checks recorded yet.
    pub no_data: u64,
}

/// RFC9457-style problem document returned for API failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short human-readable summary.
    pub title: String,
    /// HTTP status code echoed in the body.
    pub status: u16,
    /// Occurrence-specific detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Per-field validation failures, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<ProblemInvalidParam>>,
}

/// One rejected field within a validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemInvalidParam {
    /// Field name as it appears in the request payload.
    pub name: String,
    /// Why the value was rejected.
    pub reason: String,
}
