use chrono::{DateTime, Utc};

use crate::domain::geo::{Location, Route};
use crate::domain::order::DeliveryOrder;
use crate::domain::state_machine::Phase;

/// One courier's runtime delivery state. Engine-owned, mutated only through
/// tick processing and `StartDelivery`/`StopDelivery`.
///
/// Invariants (enforced by construction and by every mutation site):
/// `current_point_idx < current_points.len()` whenever `current_points` is
/// non-empty; `phase == Idle` implies `current_order` and `current_route`
/// are both `None`; `phase` in `{HeadingToPickup, HeadingToCustomer}`
/// implies `current_route` is `Some` with at least two points.
#[derive(Debug, Clone)]
pub struct DeliveryState {
    pub courier_id: String,
    pub current_location: Location,
    pub speed_kmh: f64,
    pub current_route: Option<Route>,
    pub current_points: Vec<Location>,
    pub current_point_idx: usize,
    pub phase: Phase,
    pub phase_started_at: DateTime<Utc>,
    pub current_order: Option<DeliveryOrder>,
    pub last_update_at: DateTime<Utc>,
    pub heading: Option<f64>,
}

impl DeliveryState {
    /// Constructs the state a new simulation is born into: `HeadingToPickup`
    /// with the pickup-leg route already installed.
    pub fn new_heading_to_pickup(
        courier_id: String,
        order: DeliveryOrder,
        route: Route,
        now: DateTime<Utc>,
    ) -> Result<Self, crate::domain::geo::PolylineError> {
        let points = route.points()?;
        let current_location = points.first().copied().unwrap_or(order.pickup_location);

        Ok(Self {
            courier_id,
            current_location,
            speed_kmh: 0.0,
            current_route: Some(route),
            current_points: points,
            current_point_idx: 0,
            phase: Phase::HeadingToPickup,
            phase_started_at: now,
            current_order: Some(order),
            last_update_at: now,
            heading: None,
        })
    }

    /// `true` once `phase == Idle` and no order is attached; such a row is
    /// logically inert and excluded from `GetAllDeliveries`, but its table
    /// entry lingers until an explicit `StopDelivery`.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn next_point(&self) -> Option<Location> {
        self.current_points.get(self.current_point_idx + 1).copied()
    }
}
