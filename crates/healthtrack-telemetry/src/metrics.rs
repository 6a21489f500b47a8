//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes a minimal set of counters/gauges relevant to HealthTrack services.

use std::convert::TryFrom;
use std::time::Duration;

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: std::sync::Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    checks_total: IntCounterVec,
    watched_services: IntGauge,
    probe_latency_ms: IntGauge,
    alerts_sent_total: IntCounter,
    alerts_suppressed_total: IntCounter,
    store_failures_total: IntCounter,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Number of services with an active scheduler job.
    pub watched_services: i64,
    /// Latency (ms) of the most recent probe observed.
    pub probe_latency_ms: i64,
    /// Total alerts delivered to the webhook.
    pub alerts_sent_total: u64,
    /// Total alerts suppressed by the dedupe window.
    pub alerts_suppressed_total: u64,
    /// Total check persistence failures observed.
    pub store_failures_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )?;
        let checks_total = IntCounterVec::new(
            Opts::new("checks_total", "Health checks executed by outcome"),
            &["status"],
        )?;
        let watched_services = IntGauge::with_opts(Opts::new(
            "watched_services",
            "Services with an active scheduler job",
        ))?;
        let probe_latency_ms = IntGauge::with_opts(Opts::new(
            "probe_latency_ms",
            "Latency of the most recent probe (ms)",
        ))?;
        let alerts_sent_total = IntCounter::with_opts(Opts::new(
            "alerts_sent_total",
            "Alerts delivered to the webhook",
        ))?;
        let alerts_suppressed_total = IntCounter::with_opts(Opts::new(
            "alerts_suppressed_total",
            "Alerts suppressed by the dedupe window",
        ))?;
        let store_failures_total = IntCounter::with_opts(Opts::new(
            "store_failures_total",
            "Check persistence failures",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(checks_total.clone()))?;
        registry.register(Box::new(watched_services.clone()))?;
        registry.register(Box::new(probe_latency_ms.clone()))?;
        registry.register(Box::new(alerts_sent_total.clone()))?;
        registry.register(Box::new(alerts_suppressed_total.clone()))?;
        registry.register(Box::new(store_failures_total.clone()))?;

        Ok(Self {
            inner: std::sync::Arc::new(MetricsInner {
                registry,
                http_requests_total,
                checks_total,
                watched_services,
                probe_latency_ms,
                alerts_sent_total,
                alerts_suppressed_total,
                store_failures_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, code: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &code.to_string()])
            .inc();
    }

    /// Increment the check counter for the given outcome label.
    pub fn inc_check(&self, status: &str) {
        self.inner.checks_total.with_label_values(&[status]).inc();
    }

    /// Record the number of services with an active scheduler job.
    pub fn set_watched_services(&self, count: i64) {
        self.inner.watched_services.set(count);
    }

    /// Record the latency of the most recent probe.
    pub fn observe_probe_latency(&self, latency: Duration) {
        let millis = i64::try_from(latency.as_millis()).unwrap_or(i64::MAX);
        self.inner.probe_latency_ms.set(millis);
    }

    /// Count an alert delivered to the webhook.
    pub fn inc_alert_sent(&self) {
        self.inner.alerts_sent_total.inc();
    }

    /// Count an alert suppressed by the dedupe window.
    pub fn inc_alert_suppressed(&self) {
        self.inner.alerts_suppressed_total.inc();
    }

    /// Count a failed check persistence attempt.
    pub fn inc_store_failure(&self) {
        self.inner.store_failures_total.inc();
    }

    /// Produce a typed snapshot of the health-relevant collectors.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            watched_services: self.inner.watched_services.get(),
            probe_latency_ms: self.inner.probe_latency_ms.get(),
            alerts_sent_total: self.inner.alerts_sent_total.get(),
            alerts_suppressed_total: self.inner.alerts_suppressed_total.get(),
            store_failures_total: self.inner.store_failures_total.get(),
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding the metric families fails.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.inner.registry.gather(), &mut buffer)
            .context("failed to encode metrics")?;
        String::from_utf8(buffer).context("metrics exposition was not valid UTF-8")
    }
}
