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

//! HTTP prober backing the check scheduler.
//!
//! A probe is a single GET against the service's target URL with the
//! service's own timeout. Response status maps onto the check outcome:
//! server errors are `error`, client errors are `warn`, anything else that
//! answered is `ok`, and transport failures are `down`.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use healthtrack_core::model::{CheckOutcome, Service};
use healthtrack_core::service::HealthProbe;
use healthtrack_events::CheckStatus;
use tracing::debug;

/// `reqwest`-backed implementation of [`HealthProbe`].
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Construct a prober with a default client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("healthtrack-probe")
            .build()
            .context("failed to build probe HTTP client")?;
        Ok(Self { client })
    }

    /// Construct a prober around an existing client (primarily for tests).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, service: &Service) -> CheckOutcome {
        let timeout = Duration::from_secs(u64::from(service.timeout_seconds));
        let started = Instant::now();
        match self
            .client
            .get(&service.url)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
                let status = status_for(response.status().as_u16());
                debug!(
                    service = %service.name,
                    status = status.as_str(),
                    elapsed_ms,
                    "probe completed"
                );
                CheckOutcome::responded(status, elapsed_ms)
            }
            Err(err) => {
                debug!(service = %service.name, error = %err, "probe failed to connect");
                CheckOutcome::down(err.to_string())
            }
        }
    }
}

/// Map an HTTP status code onto a check outcome.
#[must_use]
pub const fn status_for(code: u16) -> CheckStatus {
    if code >= 500 {
        CheckStatus::Error
    } else if code >= 400 {
        CheckStatus::Warn
    } else {
        CheckStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use httpmock::prelude::*;
    use uuid::Uuid;

    fn service_for(url: impl Into<String>) -> Service {
        Service {
            id: Uuid::new_v4(),
            name: "probe-target".to_string(),
            url: url.into(),
            interval_seconds: 60,
            timeout_seconds: 2,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn status_mapping_matches_policy() {
        assert_eq!(status_for(200), CheckStatus::Ok);
        assert_eq!(status_for(301), CheckStatus::Ok);
        assert_eq!(status_for(404), CheckStatus::Warn);
        assert_eq!(status_for(500), CheckStatus::Error);
        assert_eq!(status_for(503), CheckStatus::Error);
    }

    #[tokio::test]
    async fn healthy_target_yields_ok_with_latency() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200);
        });

        let probe = HttpProbe::new().expect("client builds");
        let outcome = probe.probe(&service_for(server.url("/health"))).await;

        mock.assert();
        assert_eq!(outcome.status, CheckStatus::Ok);
        assert!(outcome.response_time_ms.expect("latency recorded") >= 0.0);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn server_error_yields_error_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(503);
        });

        let probe = HttpProbe::new().expect("client builds");
        let outcome = probe.probe(&service_for(server.url("/health"))).await;
        assert_eq!(outcome.status, CheckStatus::Error);
        assert!(outcome.response_time_ms.is_some());
    }

    #[tokio::test]
    async fn client_error_yields_warn_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(418);
        });

        let probe = HttpProbe::new().expect("client builds");
        let outcome = probe.probe(&service_for(server.url("/health"))).await;
        assert_eq!(outcome.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn unreachable_target_yields_down_with_error() {
        // Reserve a port and release it so the connection is refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("port reserves");
        let port = listener.local_addr().expect("addr reads").port();
        drop(listener);

        let probe = HttpProbe::new().expect("client builds");
        let outcome = probe
            .probe(&service_for(format!("http://127.0.0.1:{port}/health")))
            .await;
        assert_eq!(outcome.status, CheckStatus::Down);
        assert!(outcome.response_time_ms.is_none());
        assert!(outcome.error.is_some());
    }
}
