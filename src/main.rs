//! Courier Emulation Service
//!
//! Simulates courier telemetry for a delivery platform under test: consumes
//! order-assignment events, drives per-courier delivery simulations, and
//! publishes location/pickup/delivery events back to the bus.

use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use courier_emulation::config::Config;
use courier_emulation::di::AppState;

const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("configuration error: {e}");
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .init();

    info!("starting courier emulation service");

    let mut state = AppState::new(&config).await.map_err(|e| {
        error!(error = %e, "failed to initialize application state");
        e
    })?;

    tokio::signal::ctrl_c().await?;
    info!("received shutdown signal");

    state.shutdown(Some(SHUTDOWN_DEADLINE)).await;
    info!("courier emulation service stopped");

    Ok(())
}
