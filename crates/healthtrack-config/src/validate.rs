//! Validation and parsing helpers for configuration values.

use std::net::IpAddr;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Parse a bind address string into an [`IpAddr`].
///
/// # Errors
///
/// Returns an error when the value is not a valid IP address.
pub fn parse_bind_addr(value: &str) -> ConfigResult<IpAddr> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid("HEALTHTRACK_BIND_ADDR", value, "not an IP address"))
}

/// Parse a listener port, rejecting zero.
///
/// # Errors
///
/// Returns an error when the value is not a port in 1..=65535.
pub fn parse_port(value: &str) -> ConfigResult<u16> {
    let port: u16 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid("HEALTHTRACK_HTTP_PORT", value, "not a port number"))?;
    if port == 0 {
        return Err(ConfigError::invalid(
            "HEALTHTRACK_HTTP_PORT",
            value,
            "port must be non-zero",
        ));
    }
    Ok(port)
}

/// Parse a strictly positive millisecond threshold.
///
/// # Errors
///
/// Returns an error when the value is not a positive number.
pub fn parse_threshold_ms(field: &'static str, value: &str) -> ConfigResult<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, value, "not a number"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(ConfigError::invalid(field, value, "must be positive"));
    }
    Ok(parsed)
}

/// Parse a non-negative seconds value.
///
/// # Errors
///
/// Returns an error when the value is not an unsigned integer.
pub fn parse_seconds(field: &'static str, value: &str) -> ConfigResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, value, "not a number of seconds"))
}

/// Validate an alert webhook URL, requiring an http(s) scheme.
///
/// # Errors
///
/// Returns an error when the value is not an absolute http(s) URL.
pub fn parse_webhook_url(value: &str) -> ConfigResult<String> {
    let parsed = Url::parse(value.trim())
        .map_err(|_| ConfigError::invalid("HEALTHTRACK_ALERT_WEBHOOK", value, "not a URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            "HEALTHTRACK_ALERT_WEBHOOK",
            value,
            "scheme must be http or https",
        ));
    }
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_accepts_v4_and_v6() {
        assert!(parse_bind_addr("0.0.0.0").is_ok());
        assert!(parse_bind_addr("::1").is_ok());
        assert!(parse_bind_addr("localhost").is_err());
    }

    #[test]
    fn port_rejects_zero_and_garbage() {
        assert_eq!(parse_port("8080").unwrap(), 8080);
        assert!(parse_port("0").is_err());
        assert!(parse_port("eighty").is_err());
    }

    #[test]
    fn thresholds_must_be_positive_numbers() {
        assert!(parse_threshold_ms("X", "250.5").is_ok());
        assert!(parse_threshold_ms("X", "0").is_err());
        assert!(parse_threshold_ms("X", "-4").is_err());
        assert!(parse_threshold_ms("X", "NaN").is_err());
    }

    #[test]
    fn webhook_requires_http_scheme() {
        assert!(parse_webhook_url("https://hooks.example.com/T123").is_ok());
        assert!(parse_webhook_url("ftp://hooks.example.com").is_err());
        assert!(parse_webhook_url("not a url").is_err());
    }
}
