//! Kafka adapters: the outbound event publisher for this service's own topics.

pub mod kafka_publisher;

pub use kafka_publisher::{KafkaEventPublisher, KafkaPublisherConfig};
