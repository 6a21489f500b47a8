//! Environment loading for the application configuration.
//!
//! All settings use the `HEALTHTRACK_` prefix except `DATABASE_URL`, which
//! keeps its conventional name. The loader takes the environment through a
//! provider closure so tests can inject values without mutating the process
//! environment.

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{AlertConfig, AppConfig, TelemetryConfig};
use crate::validate::{
    parse_bind_addr, parse_port, parse_seconds, parse_threshold_ms, parse_webhook_url,
};

/// Load the configuration from the process environment.
///
/// # Errors
///
/// Returns an error when `DATABASE_URL` is absent or any provided setting
/// fails validation.
pub fn load_from_env() -> ConfigResult<AppConfig> {
    load_with(|name| std::env::var(name).ok())
}

/// Load the configuration from an arbitrary settings provider.
///
/// # Errors
///
/// Returns an error when `DATABASE_URL` is absent or any provided setting
/// fails validation.
pub fn load_with(provider: impl Fn(&str) -> Option<String>) -> ConfigResult<AppConfig> {
    let database_url = provider("DATABASE_URL")
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingSetting {
            name: "DATABASE_URL",
        })?;

    let instance_name = provider("HEALTHTRACK_INSTANCE_NAME")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| defaults::INSTANCE_NAME.to_string());

    let bind_addr = match provider("HEALTHTRACK_BIND_ADDR") {
        Some(value) => parse_bind_addr(&value)?,
        None => parse_bind_addr(defaults::BIND_ADDR)?,
    };

    let http_port = match provider("HEALTHTRACK_HTTP_PORT") {
        Some(value) => parse_port(&value)?,
        None => defaults::HTTP_PORT,
    };

    let apdex_threshold_ms = match provider("HEALTHTRACK_APDEX_THRESHOLD_MS") {
        Some(value) => parse_threshold_ms("HEALTHTRACK_APDEX_THRESHOLD_MS", &value)?,
        None => defaults::APDEX_THRESHOLD_MS,
    };

    let webhook_url = match provider("HEALTHTRACK_ALERT_WEBHOOK") {
        Some(value) if !value.trim().is_empty() => Some(parse_webhook_url(&value)?),
        _ => None,
    };

    let dedupe_seconds = match provider("HEALTHTRACK_ALERT_DEDUPE_SECONDS") {
        Some(value) => parse_seconds("HEALTHTRACK_ALERT_DEDUPE_SECONDS", &value)?,
        None => defaults::ALERT_DEDUPE_SECONDS,
    };

    let latency_threshold_ms = match provider("HEALTHTRACK_ALERT_LATENCY_THRESHOLD_MS") {
        Some(value) => parse_threshold_ms("HEALTHTRACK_ALERT_LATENCY_THRESHOLD_MS", &value)?,
        None => defaults::ALERT_LATENCY_THRESHOLD_MS,
    };

    let level = provider("HEALTHTRACK_LOG_LEVEL")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| defaults::LOG_LEVEL.to_string());
    let json = provider("HEALTHTRACK_LOG_JSON").is_some_and(|value| flag(&value));

    Ok(AppConfig {
        instance_name,
        bind_addr,
        http_port,
        database_url,
        apdex_threshold_ms,
        alert: AlertConfig {
            webhook_url,
            dedupe_seconds,
            latency_threshold_ms,
        },
        telemetry: TelemetryConfig { level, json },
    })
}

fn flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn provider(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn database_url_is_required() {
        let err = load_with(provider(&[])).expect_err("missing DATABASE_URL must fail");
        assert!(matches!(
            err,
            ConfigError::MissingSetting {
                name: "DATABASE_URL"
            }
        ));
    }

    #[test]
    fn defaults_fill_unset_settings() {
        let config = load_with(provider(&[("DATABASE_URL", "postgres://localhost/ht")]))
            .expect("minimal environment loads");
        assert_eq!(config.instance_name, "healthtrack");
        assert_eq!(config.http_port, defaults::HTTP_PORT);
        assert!(config.bind_addr.is_loopback());
        assert!(!config.alert.enabled());
        assert_eq!(config.alert.dedupe_seconds, defaults::ALERT_DEDUPE_SECONDS);
        assert!(!config.telemetry.json);
    }

    #[test]
    fn explicit_settings_override_defaults() {
        let config = load_with(provider(&[
            ("DATABASE_URL", "postgres://localhost/ht"),
            ("HEALTHTRACK_BIND_ADDR", "0.0.0.0"),
            ("HEALTHTRACK_HTTP_PORT", "9100"),
            ("HEALTHTRACK_APDEX_THRESHOLD_MS", "250"),
            ("HEALTHTRACK_ALERT_WEBHOOK", "https://hooks.example.com/x"),
            ("HEALTHTRACK_ALERT_DEDUPE_SECONDS", "60"),
            ("HEALTHTRACK_LOG_JSON", "yes"),
        ]))
        .expect("environment loads");
        assert_eq!(config.http_port, 9100);
        assert!(!config.bind_addr.is_loopback());
        assert!((config.apdex_threshold_ms - 250.0).abs() < f64::EPSILON);
        assert!(config.alert.enabled());
        assert_eq!(config.alert.dedupe_seconds, 60);
        assert!(config.telemetry.json);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = load_with(provider(&[
            ("DATABASE_URL", "postgres://localhost/ht"),
            ("HEALTHTRACK_HTTP_PORT", "0"),
        ]))
        .expect_err("zero port must fail");
        assert!(matches!(err, ConfigError::InvalidField { .. }));
    }
}
