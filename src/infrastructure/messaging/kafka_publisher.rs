use std::time::Duration;

use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use tracing::instrument;

use crate::domain::events::DomainEvent;
use crate::domain::ports::{EventPublisher, EventPublisherError};

/// Output topic names (§6.1).
pub mod topics {
    pub const COURIER_LOCATION: &str = "delivery.courier.location_received.v1";
    pub const ORDER_PICKED_UP: &str = "delivery.order.order_picked_up.v1";
    pub const ORDER_DELIVERED: &str = "delivery.order.order_delivered.v1";
}

#[derive(Debug, Clone)]
pub struct KafkaPublisherConfig {
    pub brokers: String,
    pub client_id: String,
    pub message_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for KafkaPublisherConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            client_id: "courier-emulation".to_string(),
            message_timeout_ms: 5_000,
            request_timeout_ms: 5_000,
        }
    }
}

impl KafkaPublisherConfig {
    pub fn from_env() -> Self {
        Self {
            brokers: std::env::var("WATERMILL_KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string()),
            client_id: std::env::var("KAFKA_CLIENT_ID").unwrap_or_else(|_| "courier-emulation".to_string()),
            message_timeout_ms: std::env::var("KAFKA_MESSAGE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            request_timeout_ms: std::env::var("KAFKA_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
        }
    }
}

/// `EventPublisher` backed by an `rdkafka::FutureProducer`. Dispatches each
/// `DomainEvent` to its topic, keyed per §6.1 (`courier_id` for location,
/// `order_id` for pickup/delivery).
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaEventPublisher {
    pub fn new(config: KafkaPublisherConfig) -> Result<Self, EventPublisherError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .set("request.timeout.ms", config.request_timeout_ms.to_string())
            .create()
            .map_err(|e| EventPublisherError::ConnectionError(e.to_string()))?;

        Ok(Self { producer, timeout: Duration::from_millis(config.message_timeout_ms) })
    }

    async fn publish_to_topic(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), EventPublisherError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        self.producer
            .send(record, self.timeout)
            .await
            .map_err(|(e, _)| EventPublisherError::PublishFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    #[instrument(skip(self, event))]
    async fn publish(&self, event: DomainEvent) -> Result<(), EventPublisherError> {
        match event {
            DomainEvent::CourierLocation(event) => {
                let payload = serde_json::to_vec(&event).map_err(|e| EventPublisherError::SerializationError(e.to_string()))?;
                self.publish_to_topic(topics::COURIER_LOCATION, &event.courier_id, &payload).await
            }
            DomainEvent::PickUpOrder(event) => {
                let payload = serde_json::to_vec(&event).map_err(|e| EventPublisherError::SerializationError(e.to_string()))?;
                self.publish_to_topic(topics::ORDER_PICKED_UP, &event.order_id, &payload).await
            }
            DomainEvent::DeliverOrder(event) => {
                let payload = serde_json::to_vec(&event).map_err(|e| EventPublisherError::SerializationError(e.to_string()))?;
                self.publish_to_topic(topics::ORDER_DELIVERED, &event.order_id, &payload).await
            }
        }
    }
}
