//! Dependency wiring
//!
//! Constructs the simulation engine, its routing and publishing adapters,
//! and the assignment intake consumer, and ties them to one shutdown signal.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::engine::SimulationEngine;
use crate::infrastructure::messaging::{KafkaEventPublisher, KafkaPublisherConfig};
use crate::intake::{AssignmentIntake, IntakeConfig, IntakeError};
use crate::routing::OsrmRouteProvider;

#[derive(Debug, Error)]
pub enum DiError {
    #[error("failed to construct the event publisher: {0}")]
    Publisher(String),
    #[error("failed to construct the assignment intake: {0}")]
    Intake(#[from] IntakeError),
    #[error("invalid OSRM_URL: {0}")]
    InvalidOsrmUrl(String),
}

/// Everything the process needs to run: the engine and its running
/// background tasks, and the shutdown handle that stops them.
pub struct AppState {
    pub engine: SimulationEngine<OsrmRouteProvider, KafkaEventPublisher>,
    shutdown: CancellationToken,
    intake_task: Option<tokio::task::JoinHandle<()>>,
}

impl AppState {
    /// Builds the engine and its adapters, then spawns the assignment
    /// intake consumer as a background task.
    pub async fn new(config: &Config) -> Result<Self, DiError> {
        info!("initializing application state");

        let osrm_url = Url::parse(&config.osrm_url).map_err(|e| DiError::InvalidOsrmUrl(e.to_string()))?;
        let route_provider = Arc::new(OsrmRouteProvider::new(osrm_url, config.osrm_timeout));

        let publisher_config = KafkaPublisherConfig { brokers: config.kafka_brokers.clone(), ..KafkaPublisherConfig::default() };
        let event_publisher =
            Arc::new(KafkaEventPublisher::new(publisher_config).map_err(|e| DiError::Publisher(e.to_string()))?);

        let engine = SimulationEngine::new(route_provider, event_publisher, config.engine);

        let shutdown = CancellationToken::new();
        let intake_config = IntakeConfig { brokers: config.kafka_brokers.clone(), ..IntakeConfig::default() };
        let intake = AssignmentIntake::new(intake_config, engine.clone(), shutdown.child_token())?;

        let intake_task = tokio::spawn(async move {
            intake.run().await;
        });

        info!("application state initialized");

        Ok(Self { engine, shutdown, intake_task: Some(intake_task) })
    }

    /// Signals the intake consumer and every active simulation to stop, and
    /// waits for them to finish (bounded by `deadline`, if given).
    pub async fn shutdown(&mut self, deadline: Option<std::time::Duration>) {
        info!("shutting down");
        self.shutdown.cancel();

        if let Some(task) = self.intake_task.take() {
            match deadline {
                Some(timeout) => {
                    let _ = tokio::time::timeout(timeout, task).await;
                }
                None => {
                    let _ = task.await;
                }
            }
        }

        self.engine.stop(deadline).await;
    }
}
