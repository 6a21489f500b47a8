//! Core monitoring domain types and DTOs shared across the workspace.

use chrono::{DateTime, Utc};
use healthtrack_events::CheckStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest accepted check interval, in seconds.
pub const MIN_INTERVAL_SECONDS: u32 = 1;
/// Largest accepted check interval (one day), in seconds.
pub const MAX_INTERVAL_SECONDS: u32 = 86_400;
/// Smallest accepted probe timeout, in seconds.
pub const MIN_TIMEOUT_SECONDS: u32 = 1;
/// Largest accepted probe timeout, in seconds.
pub const MAX_TIMEOUT_SECONDS: u32 = 600;
/// Check interval applied when a create request omits one.
pub const DEFAULT_INTERVAL_SECONDS: u32 = 60;
/// Probe timeout applied when a create request omits one.
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 10;

/// Request payload for registering a service with the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    /// Human-readable display name; unique across the fleet.
    pub name: String,
    /// Target URL probed on every check.
    pub url: String,
    /// Seconds between consecutive checks.
    pub interval_seconds: u32,
    /// Seconds before an unanswered probe is abandoned.
    pub timeout_seconds: u32,
}

impl NewService {
    /// Convenience constructor applying the default cadence.
    #[must_use]
    pub fn with_defaults(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// A registered, monitored service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Identifier assigned by the backend at registration time.
    pub id: Uuid,
    /// Human-readable display name; unique across the fleet.
    pub name: String,
    /// Target URL probed on every check.
    pub url: String,
    /// Seconds between consecutive checks.
    pub interval_seconds: u32,
    /// Seconds before an unanswered probe is abandoned.
    pub timeout_seconds: u32,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Result of a single probe, before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Qualitative outcome of the probe.
    pub status: CheckStatus,
    /// Observed response time; absent when the target never answered.
    pub response_time_ms: Option<f64>,
    /// Transport error message captured for `down` outcomes.
    pub error: Option<String>,
}

impl CheckOutcome {
    /// Outcome for a probe that received a response.
    #[must_use]
    pub const fn responded(status: CheckStatus, response_time_ms: f64) -> Self {
        Self {
            status,
            response_time_ms: Some(response_time_ms),
            error: None,
        }
    }

    /// Outcome for a probe that never reached the target.
    #[must_use]
    pub fn down(error: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Down,
            response_time_ms: None,
            error: Some(error.into()),
        }
    }
}

/// A persisted check result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Identifier of the stored record.
    pub id: Uuid,
    /// The service this check belongs to.
    pub service_id: Uuid,
    /// When the probe completed.
    pub timestamp: DateTime<Utc>,
    /// Qualitative outcome of the probe.
    pub status: CheckStatus,
    /// Observed response time; absent when the target never answered.
    pub response_time_ms: Option<f64>,
    /// Transport error message captured for `down` outcomes.
    pub error: Option<String>,
}

/// Read-only metrics snapshot for one service, recomputed from the trailing
/// check window. Absence of a snapshot is the "no data" state and must never
/// be treated as an error by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// The service the snapshot describes.
    pub service_id: Uuid,
    /// Display name carried along for renderers.
    pub service_name: String,
    /// Status of the most recent check in the window.
    pub current_status: CheckStatus,
    /// Mean response time across checks that produced one.
    pub avg_response_time_ms: f64,
    /// 95th percentile response time (nearest-rank).
    pub p95_response_time_ms: f64,
    /// 99th percentile response time (nearest-rank).
    pub p99_response_time_ms: f64,
    /// Share of checks that ended `error` or `down`, in percent.
    pub error_rate_percent: f64,
    /// Share of checks that were not `down`, in percent.
    pub uptime_percent_24h: f64,
    /// Checks per minute over the observed span.
    pub request_rate_rpm: f64,
    /// Checks per second over the observed span.
    pub throughput_rps: f64,
    /// Application Performance Index in [0, 1].
    pub apdex_score: f64,
    /// Number of checks in the window.
    pub checks_count: u64,
    /// Timestamp of the most recent check in the window.
    pub last_check_timestamp: DateTime<Utc>,
}
