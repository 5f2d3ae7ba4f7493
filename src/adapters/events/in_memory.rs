//! In-memory event bus.
//!
//! Captures every published envelope for inspection. Used by tests and by
//! the CLI, which prints captured events after a run.

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// In-memory event bus with event capture.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("crisis_alert.raised.v1"));
/// ```
pub struct InMemoryEventBus {
    published: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
        }
    }

    /// Returns all published events in publish order.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns events for a specific aggregate.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .map_err(|_| {
                DomainError::new(ErrorCode::InternalError, "event bus lock poisoned")
                    .with_detail("event_type", event.event_type.clone())
            })?
            .push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(event_type: &str, aggregate_id: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, aggregate_id, "CrisisAlert", json!({}))
    }

    #[tokio::test]
    async fn publish_stores_event() {
        let bus = InMemoryEventBus::new();

        bus.publish(envelope("crisis_alert.raised.v1", "a-1"))
            .await
            .unwrap();

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event("crisis_alert.raised.v1"));
    }

    #[tokio::test]
    async fn events_of_type_filters_correctly() {
        let bus = InMemoryEventBus::new();

        bus.publish_all(vec![
            envelope("crisis_alert.raised.v1", "1"),
            envelope("protocol.missing.v1", "1"),
            envelope("crisis_alert.raised.v1", "2"),
        ])
        .await
        .unwrap();

        assert_eq!(bus.events_of_type("crisis_alert.raised.v1").len(), 2);
        assert_eq!(bus.events_for_aggregate("1").len(), 2);
    }

    #[tokio::test]
    async fn clear_removes_all_events() {
        let bus = InMemoryEventBus::new();
        bus.publish(envelope("protocol.missing.v1", "x")).await.unwrap();

        bus.clear();

        assert_eq!(bus.event_count(), 0);
    }
}
