use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::ClientConfig;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::domain::geo::Location;
use crate::domain::order::DeliveryOrder;
use crate::domain::ports::{EventPublisher, RouteProvider};
use crate::engine::{SimulationEngine, StartDeliveryError};

use super::payload::OrderAssignedPayload;

pub const TOPIC_ORDER_ASSIGNED: &str = "delivery.order.assigned.v1";
pub const CONSUMER_GROUP: &str = "courier-emulation";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub brokers: String,
    pub group_id: String,
    pub topic: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: CONSUMER_GROUP.to_string(),
            topic: TOPIC_ORDER_ASSIGNED.to_string(),
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> Self {
        Self {
            brokers: std::env::var("WATERMILL_KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string()),
            ..Self::default()
        }
    }
}

/// Consumes `delivery.order.assigned.v1` and turns each accepted message
/// into a call to `SimulationEngine::start_delivery` (§4.5).
pub struct AssignmentIntake<R, P>
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    consumer: StreamConsumer,
    engine: SimulationEngine<R, P>,
    cancellation: CancellationToken,
}

impl<R, P> AssignmentIntake<R, P>
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    pub fn new(config: IntakeConfig, engine: SimulationEngine<R, P>, cancellation: CancellationToken) -> Result<Self, IntakeError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "latest")
            .create()?;
        consumer.subscribe(&[config.topic.as_str()])?;

        Ok(Self { consumer, engine, cancellation })
    }

    /// Runs until the cancellation token fires or the subscriber channel closes (§4.5).
    pub async fn run(self) {
        info!("assignment intake started");
        loop {
            tokio::select! {
                _ = self.cancellation.cancelled() => break,
                message = self.consumer.recv() => {
                    match message {
                        Ok(message) => self.process_message(&message).await,
                        Err(e) => {
                            error!(error = %e, "assignment subscriber channel closed, ending intake");
                            break;
                        }
                    }
                }
            }
        }
        info!("assignment intake stopped");
    }

    #[instrument(skip(self, message))]
    async fn process_message(&self, message: &BorrowedMessage<'_>) {
        let Some(payload) = message.payload() else {
            warn!("assignment message has no payload, skipping");
            return;
        };

        let event: OrderAssignedPayload = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "failed to deserialize assignment payload, nacking");
                return;
            }
        };

        let pickup = match Location::new(event.pickup_address.lat, event.pickup_address.lon) {
            Ok(location) => location,
            Err(e) => {
                warn!(error = %e, "invalid pickup coordinates, nacking");
                return;
            }
        };
        let delivery = match Location::new(event.delivery_address.lat, event.delivery_address.lon) {
            Ok(location) => location,
            Err(e) => {
                warn!(error = %e, "invalid delivery coordinates, nacking");
                return;
            }
        };

        let order = DeliveryOrder::new(event.package_id.clone(), event.package_id.clone(), pickup, delivery, event.assigned_at);

        match self.engine.start_delivery(event.courier_id.clone(), order, self.cancellation.child_token()).await {
            Ok(()) => self.ack(message),
            Err(StartDeliveryError::CourierHasActiveDelivery(courier_id)) => {
                info!(courier_id = %courier_id, "courier already has an active delivery, acking as a noop");
                self.ack(message);
            }
            Err(e) => {
                warn!(error = %e, "transient error starting delivery, nacking");
            }
        }
    }

    fn ack(&self, message: &BorrowedMessage<'_>) {
        if let Err(e) = self.consumer.commit_message(message, CommitMode::Async) {
            warn!(error = %e, "failed to commit offset");
        }
    }
}
