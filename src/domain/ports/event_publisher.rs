use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::{CourierLocationEvent, DeliverOrderEvent, DomainEvent, PickUpOrderEvent};

#[derive(Debug, Error)]
pub enum EventPublisherError {
    #[error("broker connection error: {0}")]
    ConnectionError(String),
    #[error("event serialization error: {0}")]
    SerializationError(String),
    #[error("publish failed: {0}")]
    PublishFailed(String),
    #[error("publish timed out")]
    Timeout,
}

/// Outbound port for the three event streams this service produces.
///
/// A single `publish` entrypoint dispatching on `DomainEvent` mirrors the
/// shape of `KafkaEventPublisher::publish`; the per-event-method shape seen
/// elsewhere in this lineage doesn't pay for itself at three event kinds.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), EventPublisherError>;

    /// Batch form for bulk emission. Not used by the core tick loop (one
    /// event per tick); exists for integration tests and warm-up scenarios.
    async fn publish_batch(&self, events: Vec<DomainEvent>) -> Result<(), EventPublisherError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }

    async fn publish_location(&self, event: CourierLocationEvent) -> Result<(), EventPublisherError> {
        self.publish(DomainEvent::CourierLocation(event)).await
    }

    async fn publish_pickup(&self, event: PickUpOrderEvent) -> Result<(), EventPublisherError> {
        self.publish(DomainEvent::PickUpOrder(event)).await
    }

    async fn publish_delivery(&self, event: DeliverOrderEvent) -> Result<(), EventPublisherError> {
        self.publish(DomainEvent::DeliverOrder(event)).await
    }
}
