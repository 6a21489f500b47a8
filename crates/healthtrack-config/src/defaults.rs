//! Fallback values applied when the environment leaves a setting unset.

/// Instance name recorded in logs and the health endpoint.
pub const INSTANCE_NAME: &str = "healthtrack";
/// Address the API listener binds to.
pub const BIND_ADDR: &str = "127.0.0.1";
/// Port the API listener binds to.
pub const HTTP_PORT: u16 = 8_000;
/// Apdex satisfaction threshold, in milliseconds.
pub const APDEX_THRESHOLD_MS: f64 = 500.0;
/// Response-time ceiling above which an alert fires, in milliseconds.
pub const ALERT_LATENCY_THRESHOLD_MS: f64 = 2_000.0;
/// Seconds during which repeat alerts for a service are suppressed.
pub const ALERT_DEDUPE_SECONDS: u64 = 300;
/// Log level applied when `RUST_LOG` and the config leave it unset.
pub const LOG_LEVEL: &str = "info";
