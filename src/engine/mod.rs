//! The simulation engine: owns the table of active deliveries, schedules
//! per-courier ticks, and drives the phase transitions in §4.4.

pub mod config;
pub mod delivery_state;
pub mod errors;
pub mod simulation;
pub mod tick;

pub use config::EngineConfig;
pub use delivery_state::DeliveryState;
pub use errors::{StartDeliveryError, TickError};
pub use simulation::SimulationEngine;
