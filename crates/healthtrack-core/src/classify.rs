//! Qualitative health classification of metrics snapshots.
//!
//! The ordering here is policy: failure signals are evaluated before
//! degradation signals before latency signals, first match wins.

use healthtrack_events::CheckStatus;
use serde::{Deserialize, Serialize};

use crate::model::MetricsSummary;

/// Error-rate ceiling before a service is flagged, in percent.
pub const HIGH_ERROR_RATE_PERCENT: f64 = 5.0;
/// Apdex floor below which performance is considered poor.
pub const POOR_APDEX_FLOOR: f64 = 0.8;
/// Uptime floor below which availability is flagged, in percent.
pub const LOW_UPTIME_PERCENT: f64 = 95.0;
/// p99 latency ceiling, in milliseconds.
pub const HIGH_LATENCY_P99_MS: f64 = 2_000.0;

/// Qualitative health of a service, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// The most recent check could not reach the service.
    Down,
    /// More than [`HIGH_ERROR_RATE_PERCENT`] of checks failed.
    HighErrorRate,
    /// Apdex fell below [`POOR_APDEX_FLOOR`].
    PoorPerformance,
    /// Uptime fell below [`LOW_UPTIME_PERCENT`].
    LowUptime,
    /// p99 latency exceeded [`HIGH_LATENCY_P99_MS`].
    HighLatency,
    /// None of the above tripped.
    Healthy,
}

impl HealthState {
    /// Display label matching the dashboard badge text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Down => "DOWN",
            Self::HighErrorRate => "High Error Rate",
            Self::PoorPerformance => "Poor Performance",
            Self::LowUptime => "Low Uptime",
            Self::HighLatency => "High Latency",
            Self::Healthy => "Healthy",
        }
    }

    /// Whether the state counts against the fleet's degraded tally.
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        !matches!(self, Self::Healthy)
    }
}

/// Classify a metrics snapshot into a qualitative health state.
///
/// Evaluation order is fixed and first-match-wins: down, high error rate,
/// poor performance, low uptime, high latency, healthy.
#[must_use]
pub fn classify(summary: &MetricsSummary) -> HealthState {
    if summary.current_status == CheckStatus::Down {
        HealthState::Down
    } else if summary.error_rate_percent > HIGH_ERROR_RATE_PERCENT {
        HealthState::HighErrorRate
    } else if summary.apdex_score < POOR_APDEX_FLOOR {
        HealthState::PoorPerformance
    } else if summary.uptime_percent_24h < LOW_UPTIME_PERCENT {
        HealthState::LowUptime
    } else if summary.p99_response_time_ms > HIGH_LATENCY_P99_MS {
        HealthState::HighLatency
    } else {
        HealthState::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn healthy_summary() -> MetricsSummary {
        MetricsSummary {
            service_id: Uuid::nil(),
            service_name: "api".to_string(),
            current_status: CheckStatus::Ok,
            avg_response_time_ms: 120.0,
            p95_response_time_ms: 300.0,
            p99_response_time_ms: 450.0,
            error_rate_percent: 0.0,
            uptime_percent_24h: 100.0,
            request_rate_rpm: 1.0,
            throughput_rps: 0.016,
            apdex_score: 0.98,
            checks_count: 1_440,
            last_check_timestamp: Utc::now(),
        }
    }

    #[test]
    fn healthy_when_nothing_trips() {
        assert_eq!(classify(&healthy_summary()), HealthState::Healthy);
    }

    #[test]
    fn down_outranks_every_other_signal() {
        let summary = MetricsSummary {
            current_status: CheckStatus::Down,
            error_rate_percent: 100.0,
            apdex_score: 0.0,
            uptime_percent_24h: 0.0,
            p99_response_time_ms: 10_000.0,
            ..healthy_summary()
        };
        assert_eq!(classify(&summary), HealthState::Down);
    }

    #[test]
    fn error_rate_outranks_performance_signals() {
        let summary = MetricsSummary {
            error_rate_percent: 6.0,
            apdex_score: 0.1,
            uptime_percent_24h: 10.0,
            p99_response_time_ms: 9_000.0,
            ..healthy_summary()
        };
        assert_eq!(classify(&summary), HealthState::HighErrorRate);
    }

    #[test]
    fn apdex_outranks_uptime_and_latency() {
        let summary = MetricsSummary {
            apdex_score: 0.5,
            uptime_percent_24h: 10.0,
            p99_response_time_ms: 9_000.0,
            ..healthy_summary()
        };
        assert_eq!(classify(&summary), HealthState::PoorPerformance);
    }

    #[test]
    fn uptime_outranks_latency() {
        let summary = MetricsSummary {
            uptime_percent_24h: 90.0,
            p99_response_time_ms: 9_000.0,
            ..healthy_summary()
        };
        assert_eq!(classify(&summary), HealthState::LowUptime);
    }

    #[test]
    fn latency_is_the_weakest_signal() {
        let summary = MetricsSummary {
            p99_response_time_ms: 2_500.0,
            ..healthy_summary()
        };
        assert_eq!(classify(&summary), HealthState::HighLatency);
    }

    #[test]
    fn thresholds_are_exclusive_at_the_boundary() {
        let summary = MetricsSummary {
            error_rate_percent: HIGH_ERROR_RATE_PERCENT,
            uptime_percent_24h: LOW_UPTIME_PERCENT,
            apdex_score: POOR_APDEX_FLOOR,
            p99_response_time_ms: HIGH_LATENCY_P99_MS,
            ..healthy_summary()
        };
        assert_eq!(classify(&summary), HealthState::Healthy);
    }
}
