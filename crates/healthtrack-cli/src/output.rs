//! Terminal rendering for the dashboard and listing commands.

use std::fmt::Write as _;

use healthtrack_api_models::{CheckView, MetricsSummaryView, OverviewResponse, ServiceView};
use healthtrack_core::model::MetricsSummary;
use healthtrack_core::{HealthState, classify};

use crate::commands::dashboard::DashboardEntry;

/// Classify a wire-level summary without the caller converting types.
pub(crate) fn health_of(metrics: &MetricsSummaryView) -> HealthState {
    classify(&MetricsSummary::from(metrics.clone()))
}

/// Render one full dashboard cycle: fleet header plus one card per service.
pub(crate) fn render_dashboard(entries: &[DashboardEntry]) -> String {
    let mut healthy = 0usize;
    let mut issues = 0usize;
    let mut waiting = 0usize;
    for entry in entries {
        match &entry.metrics {
            Some(metrics) if health_of(metrics) == HealthState::Healthy => healthy += 1,
            Some(_) => issues += 1,
            None => waiting += 1,
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "HealthTrack: {} services, {healthy} healthy, {issues} with issues, {waiting} awaiting data",
        entries.len()
    );
    if entries.is_empty() {
        let _ = writeln!(out, "no services yet; add one with 'healthtrack service add'");
        return out;
    }
    for entry in entries {
        out.push('\n');
        out.push_str(&render_card(&entry.service, entry.metrics.as_ref()));
    }
    out
}

/// Render one service's status card. Absent metrics render the neutral
/// "no data" card and must never be treated as an error.
pub(crate) fn render_card(service: &ServiceView, metrics: Option<&MetricsSummaryView>) -> String {
    let mut out = String::new();
    match metrics {
        Some(metrics) => {
            let state = health_of(metrics);
            let _ = writeln!(out, "[{}] {}", state.label(), service.name);
            let _ = writeln!(out, "  url: {}", service.url);
            let _ = writeln!(
                out,
                "  latency: avg {:.1} ms, p95 {:.1} ms, p99 {:.1} ms",
                metrics.avg_response_time_ms,
                metrics.p95_response_time_ms,
                metrics.p99_response_time_ms
            );
            let _ = writeln!(
                out,
                "  apdex {:.2}, error rate {:.2}%, uptime {:.2}%",
                metrics.apdex_score, metrics.error_rate_percent, metrics.uptime_percent_24h
            );
            let _ = writeln!(
                out,
                "  rate {:.2} req/min ({:.3} req/s)",
                metrics.request_rate_rpm, metrics.throughput_rps
            );
            let _ = writeln!(
                out,
                "  {} checks, last at {}",
                metrics.checks_count,
                metrics.last_check_timestamp.format("%Y-%m-%d %H:%M:%S")
            );
        }
        None => {
            let _ = writeln!(out, "[No Data] {}", service.name);
            let _ = writeln!(out, "  url: {}", service.url);
            let _ = writeln!(out, "  waiting for first health check");
        }
    }
    out
}

/// Render the service listing table.
pub(crate) fn render_service_table(services: &[ServiceView]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36} {:<24} {:>8} {:>8} URL",
        "ID", "NAME", "INTERVAL", "TIMEOUT"
    );
    for service in services {
        let _ = writeln!(
            out,
            "{:<36} {:<24} {:>7}s {:>7}s {}",
            service.id, service.name, service.interval_seconds, service.timeout_seconds, service.url
        );
    }
    out
}

/// Render the check-history table, newest first.
pub(crate) fn render_check_table(checks: &[CheckView]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<7} {:>10} ERROR", "TIME", "STATUS", "LATENCY");
    for check in checks {
        let latency = check
            .response_time_ms
            .map_or_else(|| "-".to_string(), |ms| format!("{ms:.1} ms"));
        let _ = writeln!(
            out,
            "{:<20} {:<7} {:>10} {}",
            check.timestamp.format("%Y-%m-%d %H:%M:%S"),
            check.status.as_str(),
            latency,
            check.error.as_deref().unwrap_or("-")
        );
    }
    out
}

/// Render the fleet overview line.
pub(crate) fn render_overview(overview: &OverviewResponse) -> String {
    format!(
        "services: {} total, {} healthy, {} degraded, {} awaiting data\n",
        overview.services_total, overview.healthy, overview.degraded, overview.no_data
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use healthtrack_events::CheckStatus;
    use uuid::Uuid;

    fn service() -> ServiceView {
        ServiceView {
            id: Uuid::from_u128(1),
            name: "gateway".to_string(),
            url: "https://gateway.internal/health".to_string(),
            interval_seconds: 60,
            timeout_seconds: 10,
            created_at: Utc::now(),
        }
    }

    fn metrics(status: CheckStatus) -> MetricsSummaryView {
        MetricsSummaryView {
            service_id: Uuid::from_u128(1),
            service_name: "gateway".to_string(),
            current_status: status,
            avg_response_time_ms: 120.0,
            p95_response_time_ms: 280.0,
            p99_response_time_ms: 420.0,
            error_rate_percent: 0.0,
            uptime_percent_24h: 100.0,
            request_rate_rpm: 1.0,
            throughput_rps: 0.016,
            apdex_score: 0.97,
            checks_count: 1_440,
            last_check_timestamp: Utc::now(),
        }
    }

    #[test]
    fn missing_metrics_render_the_no_data_card() {
        let card = render_card(&service(), None);
        assert!(card.contains("[No Data]"));
        assert!(card.contains("waiting for first health check"));
    }

    #[test]
    fn healthy_metrics_render_the_healthy_badge() {
        let card = render_card(&service(), Some(&metrics(CheckStatus::Ok)));
        assert!(card.contains("[Healthy] gateway"));
        assert!(card.contains("apdex 0.97"));
    }

    #[test]
    fn down_metrics_render_the_down_badge() {
        let card = render_card(&service(), Some(&metrics(CheckStatus::Down)));
        assert!(card.contains("[DOWN] gateway"));
    }

    #[test]
    fn dashboard_header_counts_by_state() {
        let entries = vec![
            DashboardEntry {
                service: service(),
                metrics: Some(metrics(CheckStatus::Ok)),
            },
            DashboardEntry {
                service: service(),
                metrics: Some(metrics(CheckStatus::Down)),
            },
            DashboardEntry {
                service: service(),
                metrics: None,
            },
        ];
        let rendered = render_dashboard(&entries);
        assert!(
            rendered.contains("3 services, 1 healthy, 1 with issues, 1 awaiting data"),
            "unexpected header: {rendered}"
        );
    }

    #[test]
    fn empty_dashboard_suggests_adding_a_service() {
        let rendered = render_dashboard(&[]);
        assert!(rendered.contains("no services yet"));
    }

    #[test]
    fn check_table_shows_missing_latency_as_dash() {
        let checks = vec![CheckView {
            id: Uuid::nil(),
            service_id: Uuid::nil(),
            timestamp: Utc::now(),
            status: CheckStatus::Down,
            response_time_ms: None,
            error: Some("connection refused".to_string()),
        }];
        let table = render_check_table(&checks);
        assert!(table.contains("down"));
        assert!(table.contains("connection refused"));
    }
}
