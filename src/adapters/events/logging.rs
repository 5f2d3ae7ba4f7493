//! Event publisher that writes each envelope to the tracing log.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// Logs events instead of shipping them to a broker.
///
/// `protocol.missing.v1` is an operational alert and logs at error level.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventPublisher;

impl LoggingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if event.event_type.starts_with("protocol.missing") {
            tracing::error!(
                event_type = %event.event_type,
                aggregate_id = %event.aggregate_id,
                payload = %event.payload,
                "operational alert"
            );
        } else {
            tracing::info!(
                event_type = %event.event_type,
                aggregate_id = %event.aggregate_id,
                event_id = %event.event_id,
                "domain event"
            );
        }
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

    #[tokio::test]
    async fn publish_never_fails() {
        let publisher = LoggingEventPublisher::new();
        let result = publisher
            .publish(EventEnvelope::new("protocol.missing.v1", "a", "CrisisAlert", json!({})))
            .await;
        assert!(result.is_ok());
    }
}
