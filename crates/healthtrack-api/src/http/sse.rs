//! Server-sent events filters and streaming helpers.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{self, Sse},
};
use futures_util::{StreamExt, future};
use healthtrack_events::{EventBus, EventEnvelope, EventId};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::http::constants::{EVENT_KIND_WHITELIST, HEADER_LAST_EVENT_ID, SSE_KEEP_ALIVE_SECS};
use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SseQuery {
    #[serde(default)]
    pub(crate) service: Option<String>,
    #[serde(default)]
    pub(crate) event: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SseFilter {
    pub(crate) service_ids: HashSet<Uuid>,
    pub(crate) event_kinds: HashSet<String>,
}

pub(crate) async fn stream_events(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl futures_core::Stream<Item = Result<sse::Event, Infallible>> + Send>, ApiError>
{
    let last_id = headers
        .get(HEADER_LAST_EVENT_ID)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<EventId>().ok());

    let filter = build_sse_filter(&query)?;
    let stream = event_sse_stream(state.events.clone(), last_id, filter);

    Ok(Sse::new(stream).keep_alive(
        sse::KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS))
            .text("keep-alive"),
    ))
}

pub(crate) fn build_sse_filter(query: &SseQuery) -> Result<SseFilter, ApiError> {
    let mut filter = SseFilter::default();

    if let Some(services) = query.service.as_deref() {
        for value in split_comma_separated(services) {
            let parsed = Uuid::parse_str(&value).map_err(|_| {
                ApiError::bad_request(format!("service filter '{value}' is not a valid UUID"))
            })?;
            filter.service_ids.insert(parsed);
        }
    }

    if let Some(events) = query.event.as_deref() {
        for value in split_comma_separated(events) {
            if !EVENT_KIND_WHITELIST.contains(&value.as_str()) {
                return Err(ApiError::bad_request(format!(
                    "event filter '{value}' is not recognised"
                )));
            }
            filter.event_kinds.insert(value);
        }
    }

    Ok(filter)
}

pub(crate) fn matches_sse_filter(envelope: &EventEnvelope, filter: &SseFilter) -> bool {
    if !filter.event_kinds.is_empty() && !filter.event_kinds.contains(envelope.event.kind()) {
        return false;
    }

    if !filter.service_ids.is_empty() {
        let Some(service_id) = envelope.event.service_id() else {
            return false;
        };
        if !filter.service_ids.contains(&service_id) {
            return false;
        }
    }

    true
}

fn split_comma_separated(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

fn event_replay_stream(
    bus: EventBus,
    since: Option<EventId>,
) -> impl futures_core::Stream<Item = EventEnvelope> + Send {
    stream! {
        let mut stream = bus.subscribe(since);
        while let Some(envelope) = stream.next().await {
            yield envelope;
        }
    }
}

pub(crate) fn event_sse_stream(
    bus: EventBus,
    since: Option<EventId>,
    filter: SseFilter,
) -> impl futures_core::Stream<Item = Result<sse::Event, Infallible>> + Send {
    let filter = Arc::new(filter);
    event_replay_stream(bus, since)
        .filter({
            let filter = Arc::clone(&filter);
            move |envelope| future::ready(matches_sse_filter(envelope, &filter))
        })
        .filter_map(|envelope| async move {
            match serde_json::to_string(&envelope) {
                Ok(payload) => Some(Ok(sse::Event::default()
                    .id(envelope.id.to_string())
                    .event(envelope.event.kind())
                    .data(payload))),
                Err(err) => {
                    error!(error = %err, "failed to serialise SSE event payload");
                    None
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthtrack_events::{CheckStatus, Event};
    use tokio::time::sleep;

    #[test]
    fn build_sse_filter_parses_filters() {
        let query = SseQuery {
            service: Some(format!("{},{}", Uuid::nil(), Uuid::from_u128(1))),
            event: Some("check_completed,alert_raised".to_string()),
        };
        let filter = build_sse_filter(&query).expect("filter builds");
        assert_eq!(filter.service_ids.len(), 2);
        assert_eq!(filter.event_kinds.len(), 2);
    }

    #[test]
    fn build_sse_filter_rejects_unknown_event_kind() {
        let query = SseQuery {
            service: None,
            event: Some("check_completed,unknown".to_string()),
        };
        assert!(build_sse_filter(&query).is_err());
    }

    #[test]
    fn matches_sse_filter_respects_kind_and_service() {
        let service_id = Uuid::from_u128(42);
        let filter = SseFilter {
            service_ids: std::iter::once(service_id).collect(),
            event_kinds: std::iter::once("check_completed".to_string()).collect(),
        };
        let matching = EventEnvelope {
            id: 1,
            timestamp: chrono::Utc::now(),
            event: Event::CheckCompleted {
                service_id,
                status: CheckStatus::Ok,
                response_time_ms: Some(12.0),
            },
        };
        assert!(matches_sse_filter(&matching, &filter));

        let fleet_wide = EventEnvelope {
            id: 2,
            timestamp: chrono::Utc::now(),
            event: Event::HealthChanged {
                degraded: Vec::new(),
            },
        };
        assert!(!matches_sse_filter(&fleet_wide, &filter));
    }

    #[tokio::test]
    async fn sse_stream_emits_event_for_service_added() {
        let bus = EventBus::with_capacity(16);
        let publisher = bus.clone();
        let service_id = Uuid::new_v4();
        tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            let _ = publisher.publish(Event::ServiceAdded {
                service_id,
                name: "example".to_string(),
            });
        });
        let stream = event_sse_stream(bus.clone(), None, SseFilter::default());
        futures_util::pin_mut!(stream);
        match tokio::time::timeout(Duration::from_millis(200), stream.next())
            .await
            .expect("timed out waiting for SSE event")
        {
            Some(Ok(_)) => {}
            other => panic!("expected SSE event, got {other:?}"),
        }
    }
}
