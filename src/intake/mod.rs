//! Assignment intake: consumes order-assigned messages and starts new simulations (§4.5).

pub mod assignment_intake;
pub mod payload;

pub use assignment_intake::{AssignmentIntake, IntakeConfig, IntakeError};
