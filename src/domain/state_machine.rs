use std::fmt;

/// The five phases of one courier's delivery workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    HeadingToPickup,
    PickingUp,
    HeadingToCustomer,
    Delivering,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::HeadingToPickup => write!(f, "HeadingToPickup"),
            Phase::PickingUp => write!(f, "PickingUp"),
            Phase::HeadingToCustomer => write!(f, "HeadingToCustomer"),
            Phase::Delivering => write!(f, "Delivering"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid phase transition from {from} to {to}")]
pub struct InvalidTransitionError {
    pub from: Phase,
    pub to: Phase,
}

impl Phase {
    /// Valid transitions:
    /// ```text
    /// Idle -> HeadingToPickup
    /// HeadingToPickup -> PickingUp
    /// PickingUp -> HeadingToCustomer
    /// HeadingToCustomer -> Delivering
    /// Delivering -> Idle
    /// ```
    /// `PickingUp -> Idle` is deliberately absent: pickup can only be
    /// abandoned by an external `StopDelivery`, never by the tick loop itself.
    pub fn can_transition_to(&self, target: Phase) -> bool {
        matches!(
            (self, target),
            (Phase::Idle, Phase::HeadingToPickup)
                | (Phase::HeadingToPickup, Phase::PickingUp)
                | (Phase::PickingUp, Phase::HeadingToCustomer)
                | (Phase::HeadingToCustomer, Phase::Delivering)
                | (Phase::Delivering, Phase::Idle)
        )
    }

    pub fn transition_to(self, target: Phase) -> Result<Phase, InvalidTransitionError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(InvalidTransitionError { from: self, to: target })
        }
    }

    /// `true` for phases in which the courier is travelling a route.
    pub fn is_moving(&self) -> bool {
        matches!(self, Phase::HeadingToPickup | Phase::HeadingToCustomer)
    }

    /// `true` for phases in which the courier is stationary, dwelling out a wait timer.
    pub fn is_waiting(&self) -> bool {
        matches!(self, Phase::PickingUp | Phase::Delivering)
    }

    /// The courier status string carried on `CourierLocationEvent`.
    pub fn location_status(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::HeadingToPickup | Phase::HeadingToCustomer => "moving",
            Phase::PickingUp => "picking_up",
            Phase::Delivering => "delivering",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions_accepted() {
        assert!(Phase::Idle.can_transition_to(Phase::HeadingToPickup));
        assert!(Phase::HeadingToPickup.can_transition_to(Phase::PickingUp));
        assert!(Phase::PickingUp.can_transition_to(Phase::HeadingToCustomer));
        assert!(Phase::HeadingToCustomer.can_transition_to(Phase::Delivering));
        assert!(Phase::Delivering.can_transition_to(Phase::Idle));
    }

    #[test]
    fn picking_up_cannot_go_straight_to_idle() {
        assert!(!Phase::PickingUp.can_transition_to(Phase::Idle));
    }

    #[test]
    fn no_transition_skips_a_phase() {
        assert!(!Phase::Idle.can_transition_to(Phase::PickingUp));
        assert!(!Phase::Idle.can_transition_to(Phase::HeadingToCustomer));
        assert!(!Phase::Idle.can_transition_to(Phase::Delivering));
        assert!(!Phase::HeadingToPickup.can_transition_to(Phase::HeadingToCustomer));
        assert!(!Phase::HeadingToPickup.can_transition_to(Phase::Delivering));
        assert!(!Phase::HeadingToPickup.can_transition_to(Phase::Idle));
    }

    #[test]
    fn transition_to_returns_typed_error() {
        let result = Phase::Idle.transition_to(Phase::Delivering);
        assert_eq!(
            result,
            Err(InvalidTransitionError { from: Phase::Idle, to: Phase::Delivering })
        );
    }

    #[test]
    fn is_moving_is_moving_only_phases() {
        assert!(Phase::HeadingToPickup.is_moving());
        assert!(Phase::HeadingToCustomer.is_moving());
        assert!(!Phase::Idle.is_moving());
        assert!(!Phase::PickingUp.is_moving());
        assert!(!Phase::Delivering.is_moving());
    }

    #[test]
    fn is_waiting_is_waiting_only_phases() {
        assert!(Phase::PickingUp.is_waiting());
        assert!(Phase::Delivering.is_waiting());
        assert!(!Phase::Idle.is_waiting());
        assert!(!Phase::HeadingToPickup.is_waiting());
        assert!(!Phase::HeadingToCustomer.is_waiting());
    }

    #[test]
    fn location_status_mapping() {
        assert_eq!(Phase::Idle.location_status(), "idle");
        assert_eq!(Phase::HeadingToPickup.location_status(), "moving");
        assert_eq!(Phase::HeadingToCustomer.location_status(), "moving");
        assert_eq!(Phase::PickingUp.location_status(), "picking_up");
        assert_eq!(Phase::Delivering.location_status(), "delivering");
    }
}
