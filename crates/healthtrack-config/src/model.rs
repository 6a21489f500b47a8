//! Typed configuration models.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Fully resolved application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Instance name recorded in logs and the health endpoint.
    pub instance_name: String,
    /// Address the API listener binds to.
    pub bind_addr: IpAddr,
    /// Port the API listener binds to.
    pub http_port: u16,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Apdex satisfaction threshold, in milliseconds.
    pub apdex_threshold_ms: f64,
    /// Alerting policy.
    pub alert: AlertConfig,
    /// Logging knobs.
    pub telemetry: TelemetryConfig,
}

/// Alert dispatch policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Webhook that receives alert payloads; alerting is disabled when unset.
    pub webhook_url: Option<String>,
    /// Seconds during which repeat alerts for a service are suppressed.
    pub dedupe_seconds: u64,
    /// Response-time ceiling above which an alert fires, in milliseconds.
    pub latency_threshold_ms: f64,
}

impl AlertConfig {
    /// Whether alert dispatch is configured at all.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }
}

/// Logging configuration carried into the telemetry crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level string (e.g. `info`, `debug`).
    pub level: String,
    /// Force JSON output regardless of the build profile.
    pub json: bool,
}
