//! Windowed aggregation of check records into metrics snapshots.

use chrono::{DateTime, Utc};
use healthtrack_events::CheckStatus;

use crate::model::{CheckRecord, MetricsSummary, Service};

/// Trailing window over which snapshots are computed.
pub const METRICS_WINDOW: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// Apdex satisfaction threshold applied when none is configured, in
/// milliseconds. The tolerating band extends to four times this value.
pub const DEFAULT_APDEX_THRESHOLD_MS: f64 = 500.0;

/// Aggregate the window's check records into a metrics snapshot.
///
/// Returns `None` when the window holds no checks: that is the "no data"
/// state, distinct from any error. Records may arrive in any order; only
/// their timestamps matter.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(
    service: &Service,
    checks: &[CheckRecord],
    now: DateTime<Utc>,
    apdex_threshold_ms: f64,
) -> Option<MetricsSummary> {
    let latest = checks.iter().max_by_key(|check| check.timestamp)?;
    let oldest = checks
        .iter()
        .min_by_key(|check| check.timestamp)
        .expect("non-empty window has an oldest check");
    let total = checks.len();

    let mut latencies: Vec<f64> = checks
        .iter()
        .filter_map(|check| check.response_time_ms)
        .collect();
    latencies.sort_by(f64::total_cmp);

    let avg = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<f64>() / latencies.len() as f64
    };

    let failed = checks
        .iter()
        .filter(|check| matches!(check.status, CheckStatus::Error | CheckStatus::Down))
        .count();
    let reachable = checks
        .iter()
        .filter(|check| check.status != CheckStatus::Down)
        .count();

    // Span from the oldest in-window check to now, floored at one second so
    // a lone check still yields finite rates.
    let span_seconds = ((now - oldest.timestamp).num_milliseconds() as f64 / 1_000.0)
        .clamp(1.0, METRICS_WINDOW.as_secs_f64());

    Some(MetricsSummary {
        service_id: service.id,
        service_name: service.name.clone(),
        current_status: latest.status,
        avg_response_time_ms: avg,
        p95_response_time_ms: percentile(&latencies, 95.0),
        p99_response_time_ms: percentile(&latencies, 99.0),
        error_rate_percent: failed as f64 / total as f64 * 100.0,
        uptime_percent_24h: reachable as f64 / total as f64 * 100.0,
        request_rate_rpm: total as f64 / (span_seconds / 60.0),
        throughput_rps: total as f64 / span_seconds,
        apdex_score: apdex(checks, apdex_threshold_ms),
        checks_count: total as u64,
        last_check_timestamp: latest.timestamp,
    })
}

/// Nearest-rank percentile over an ascending latency set; 0 when empty.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0 * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Apdex score: satisfied within the threshold, tolerating within four times
/// it, everything else (including checks that never answered) frustrated.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn apdex(checks: &[CheckRecord], threshold_ms: f64) -> f64 {
    if checks.is_empty() {
        return 0.0;
    }

    let mut satisfied = 0usize;
    let mut tolerating = 0usize;
    for check in checks {
        if check.status != CheckStatus::Ok {
            continue;
        }
        match check.response_time_ms {
            Some(latency) if latency <= threshold_ms => satisfied += 1,
            Some(latency) if latency <= threshold_ms * 4.0 => tolerating += 1,
            _ => {}
        }
    }

    (satisfied as f64 + tolerating as f64 / 2.0) / checks.len() as f64
}
