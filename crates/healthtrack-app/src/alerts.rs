//! Webhook alert dispatch with a per-service dedupe window.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use healthtrack_config::AlertConfig;
use healthtrack_core::model::{CheckOutcome, Service};
use healthtrack_events::{CheckStatus, Event, EventBus};
use healthtrack_telemetry::Metrics;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Dispatches alert payloads to the configured webhook. Delivery is
/// fire-and-forget: failures are logged, never propagated into the
/// scheduler.
pub(crate) struct AlertDispatcher {
    client: reqwest::Client,
    webhook: reqwest::Url,
    latency_threshold_ms: f64,
    dedupe_window: Duration,
    last_sent: Mutex<HashMap<Uuid, Instant>>,
    events: EventBus,
    telemetry: Metrics,
}

impl AlertDispatcher {
    /// Build a dispatcher from the alert configuration; `None` when no
    /// webhook is configured.
    pub(crate) fn from_config(
        config: &AlertConfig,
        events: EventBus,
        telemetry: Metrics,
    ) -> AppResult<Option<Self>> {
        let Some(webhook_url) = &config.webhook_url else {
            return Ok(None);
        };

        let webhook = webhook_url
            .parse()
            .map_err(|err| AppError::probe("alerts.webhook_url", anyhow::anyhow!("{err}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|err| AppError::probe("alerts.client", err))?;

        Ok(Some(Self {
            client,
            webhook,
            latency_threshold_ms: config.latency_threshold_ms,
            dedupe_window: Duration::from_secs(config.dedupe_seconds),
            last_sent: Mutex::new(HashMap::new()),
            events,
            telemetry,
        }))
    }

    /// Evaluate one check outcome against the alert policy and dispatch if
    /// it qualifies and the dedupe window has elapsed.
    pub(crate) async fn evaluate(&self, service: &Service, outcome: &CheckOutcome) {
        let Some(reason) = alert_reason(outcome, self.latency_threshold_ms) else {
            return;
        };

        if !self.due_at(service.id, Instant::now()) {
            self.telemetry.inc_alert_suppressed();
            debug!(service_id = %service.id, reason = %reason, "alert suppressed by dedupe window");
            return;
        }

        let _ = self.events.publish(Event::AlertRaised {
            service_id: service.id,
            reason: reason.clone(),
        });

        let payload = json!({
            "service_id": service.id,
            "service_name": service.name,
            "message": format!("Service {} alert: {reason}", service.name),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        match self
            .client
            .post(self.webhook.clone())
            .json(&payload)
            .send()
            .await
        {
            Ok(_) => {
                self.telemetry.inc_alert_sent();
                debug!(service_id = %service.id, reason = %reason, "alert delivered");
            }
            Err(err) => {
                warn!(service_id = %service.id, error = %err, "alert delivery failed");
            }
        }
    }

    /// Record an alert attempt for the service, returning whether the dedupe
    /// window had elapsed.
    fn due_at(&self, service_id: Uuid, now: Instant) -> bool {
        let mut guard = self.last_sent.lock().expect("alert dedupe mutex poisoned");
        if let Some(last) = guard.get(&service_id)
            && now.saturating_duration_since(*last) < self.dedupe_window
        {
            return false;
        }
        guard.insert(service_id, now);
        true
    }
}

/// Alert policy: fire on `down` or `error` checks, or on a response time
/// exceeding the configured threshold.
pub(crate) fn alert_reason(outcome: &CheckOutcome, latency_threshold_ms: f64) -> Option<String> {
    match outcome.status {
        CheckStatus::Down | CheckStatus::Error => Some(format!(
            "status={} error={}",
            outcome.status.as_str(),
            outcome.error.as_deref().unwrap_or("-")
        )),
        CheckStatus::Ok | CheckStatus::Warn => outcome
            .response_time_ms
            .filter(|elapsed| *elapsed > latency_threshold_ms)
            .map(|elapsed| format!("high_latency={elapsed:.0}ms")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use httpmock::prelude::*;

    fn dispatcher_for(webhook: &str, dedupe_seconds: u64) -> AlertDispatcher {
        AlertDispatcher::from_config(
            &AlertConfig {
                webhook_url: Some(webhook.to_string()),
                dedupe_seconds,
                latency_threshold_ms: 2_000.0,
            },
            EventBus::with_capacity(16),
            Metrics::new().expect("registry builds"),
        )
        .expect("dispatcher builds")
        .expect("webhook configured")
    }

    fn service() -> Service {
        Service {
            id: Uuid::from_u128(5),
            name: "gateway".to_string(),
            url: "https://gateway.internal/health".to_string(),
            interval_seconds: 60,
            timeout_seconds: 10,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unconfigured_webhook_disables_alerting() {
        let dispatcher = AlertDispatcher::from_config(
            &AlertConfig {
                webhook_url: None,
                dedupe_seconds: 300,
                latency_threshold_ms: 2_000.0,
            },
            EventBus::with_capacity(4),
            Metrics::new().expect("registry builds"),
        )
        .expect("config accepted");
        assert!(dispatcher.is_none());
    }

    #[test]
    fn alert_reason_follows_the_policy() {
        assert!(alert_reason(&CheckOutcome::down("refused"), 2_000.0)
            .expect("down alerts")
            .contains("status=down"));
        assert!(alert_reason(
            &CheckOutcome::responded(CheckStatus::Error, 50.0),
            2_000.0
        )
        .expect("server errors alert")
        .contains("status=error"));
        assert_eq!(
            alert_reason(&CheckOutcome::responded(CheckStatus::Ok, 100.0), 2_000.0),
            None
        );
        assert!(alert_reason(
            &CheckOutcome::responded(CheckStatus::Ok, 3_500.0),
            2_000.0
        )
        .expect("slow responses alert")
        .contains("high_latency"));
        assert_eq!(
            alert_reason(&CheckOutcome::responded(CheckStatus::Warn, 100.0), 2_000.0),
            None,
            "client errors do not alert"
        );
    }

    #[test]
    fn dedupe_window_suppresses_and_rearms() {
        let dispatcher = dispatcher_for("https://hooks.example.com/x", 300);
        let id = Uuid::from_u128(9);
        let start = Instant::now();
        assert!(dispatcher.due_at(id, start));
        assert!(!dispatcher.due_at(id, start + Duration::from_secs(299)));
        assert!(dispatcher.due_at(id, start + Duration::from_secs(301)));
        // Other services are tracked independently.
        assert!(dispatcher.due_at(Uuid::from_u128(10), start));
    }

    #[tokio::test]
    async fn evaluate_posts_payload_and_publishes_event() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(200);
        });

        let dispatcher = dispatcher_for(&server.url("/hook"), 300);
        dispatcher
            .evaluate(&service(), &CheckOutcome::down("connection refused"))
            .await;

        mock.assert();
        assert_eq!(dispatcher.telemetry.snapshot().alerts_sent_total, 1);
        assert_eq!(dispatcher.events.last_event_id(), Some(1));

        // A second failure inside the window is suppressed.
        dispatcher
            .evaluate(&service(), &CheckOutcome::down("connection refused"))
            .await;
        assert_eq!(dispatcher.telemetry.snapshot().alerts_sent_total, 1);
        assert_eq!(dispatcher.telemetry.snapshot().alerts_suppressed_total, 1);
    }
}
