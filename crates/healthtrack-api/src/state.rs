//! Shared application state wired through the router.

use std::sync::Mutex;

use healthtrack_data::MonitorStore;
use healthtrack_events::{Event, EventBus};
use healthtrack_telemetry::Metrics;

use crate::MonitorHandles;

pub(crate) struct ApiState {
    pub(crate) store: MonitorStore,
    pub(crate) events: EventBus,
    pub(crate) telemetry: Metrics,
    pub(crate) monitor: Option<MonitorHandles>,
    pub(crate) apdex_threshold_ms: f64,
    degraded: DegradedComponents,
}

impl ApiState {
    pub(crate) fn new(
        store: MonitorStore,
        events: EventBus,
        telemetry: Metrics,
        monitor: Option<MonitorHandles>,
        apdex_threshold_ms: f64,
    ) -> Self {
        Self {
            store,
            events,
            telemetry,
            monitor,
            apdex_threshold_ms,
            degraded: DegradedComponents::default(),
        }
    }

    pub(crate) fn add_degraded_component(&self, component: &str) {
        self.degraded.add(component, &self.events);
    }

    pub(crate) fn remove_degraded_component(&self, component: &str) {
        self.degraded.remove(component, &self.events);
    }

    pub(crate) fn current_health_degraded(&self) -> Vec<String> {
        self.degraded.current()
    }
}

/// Tracks which components are currently degraded, announcing transitions on
/// the event bus.
#[derive(Default)]
struct DegradedComponents {
    inner: Mutex<Vec<String>>,
}

impl DegradedComponents {
    fn add(&self, component: &str, events: &EventBus) -> bool {
        let mut guard = self.inner.lock().expect("health status mutex poisoned");
        if guard.iter().any(|entry| entry == component) {
            return false;
        }
        guard.push(component.to_string());
        guard.sort();
        let snapshot = guard.clone();
        drop(guard);
        let _ = events.publish(Event::HealthChanged { degraded: snapshot });
        true
    }

    fn remove(&self, component: &str, events: &EventBus) -> bool {
        let mut guard = self.inner.lock().expect("health status mutex poisoned");
        let previous = guard.len();
        guard.retain(|entry| entry != component);
        if guard.len() == previous {
            return false;
        }
        let snapshot = guard.clone();
        drop(guard);
        let _ = events.publish(Event::HealthChanged { degraded: snapshot });
        true
    }

    fn current(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("health status mutex poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_components_dedupe_and_clear() {
        let events = EventBus::with_capacity(8);
        let degraded = DegradedComponents::default();
        assert!(degraded.add("database", &events));
        assert!(!degraded.add("database", &events));
        assert_eq!(degraded.current(), vec!["database"]);
        assert!(degraded.remove("database", &events));
        assert!(!degraded.remove("database", &events));
        assert!(degraded.current().is_empty());
    }

    #[test]
    fn degraded_transitions_publish_health_events() {
        let events = EventBus::with_capacity(8);
        let degraded = DegradedComponents::default();
        degraded.add("database", &events);
        degraded.remove("database", &events);
        // One event per transition, none for the no-op repeats.
        degraded.add("database", &events);
        degraded.add("database", &events);
        assert_eq!(events.last_event_id(), Some(3));
    }
}
