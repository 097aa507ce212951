use thiserror::Error;

use crate::domain::ports::{EventPublisherError, RouteProviderError};
use crate::domain::state_machine::InvalidTransitionError;

#[derive(Debug, Error)]
pub enum StartDeliveryError {
    #[error("courier {0} already has an active delivery")]
    CourierHasActiveDelivery(String),
    #[error("routing error: {0}")]
    Routing(#[from] RouteProviderError),
}

/// Faults a single tick can raise. A tick that ends in `Publish` exits its
/// simulation task and leaves the row in its pre-emit state (§7); all other
/// variants are logged and the task continues or exits per call site.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("state machine violation: {0}")]
    StateMachine(#[from] InvalidTransitionError),
    #[error("publish failed: {0}")]
    Publish(#[from] EventPublisherError),
}
