use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::Location;

/// Fixed GPS accuracy attached to every pickup confirmation; the simulator
/// does not model sensor noise so this is a constant, not a measurement.
pub const PICKUP_LOCATION_ACCURACY_M: f64 = 10.0;

/// Published on `delivery.courier.location_received.v1`, keyed by `courier_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourierLocationEvent {
    pub courier_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
}

/// The pickup address snapshot carried on a `PickUpOrderEvent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickupLocationSnapshot {
    pub lat: f64,
    pub lon: f64,
    pub accuracy: f64,
    pub timestamp: DateTime<Utc>,
}

/// Published on `delivery.order.order_picked_up.v1`, keyed by `order_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickUpOrderEvent {
    pub order_id: String,
    pub courier_id: String,
    pub pickup_location: PickupLocationSnapshot,
    pub picked_up_at: DateTime<Utc>,
}

/// The reasons a simulated delivery can fail to complete.
///
/// `PackageDamaged` and `Other` are part of the domain taxonomy but are never
/// drawn by the simulator's own failure model (§4.4.6); they exist for
/// completeness with human-entered outcomes from other producers on the same
/// topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotDeliveredReason {
    CustomerNotAvailable,
    WrongAddress,
    CustomerRefused,
    AccessDenied,
    PackageDamaged,
    Other,
}

impl NotDeliveredReason {
    /// The four reasons the simulator itself draws from.
    pub const SIMULATED: [NotDeliveredReason; 4] = [
        NotDeliveredReason::CustomerNotAvailable,
        NotDeliveredReason::WrongAddress,
        NotDeliveredReason::CustomerRefused,
        NotDeliveredReason::AccessDenied,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOutcome {
    Delivered,
    NotDelivered,
}

/// Published on `delivery.order.order_delivered.v1`, keyed by `order_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliverOrderEvent {
    pub order_id: String,
    pub courier_id: String,
    pub status: DeliveryOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NotDeliveredReason>,
    pub current_location: LocationPayload,
    pub delivered_at: DateTime<Utc>,
}

/// `{lat, lon}` as carried in wire payloads (distinct from the domain
/// `Location` value object, which enforces range invariants at construction).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LocationPayload {
    pub lat: f64,
    pub lon: f64,
}

impl From<Location> for LocationPayload {
    fn from(location: Location) -> Self {
        Self { lat: location.latitude(), lon: location.longitude() }
    }
}

/// The three event kinds this service publishes, dispatched to their topic
/// and partition key by the publisher adapter.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    CourierLocation(CourierLocationEvent),
    PickUpOrder(PickUpOrderEvent),
    DeliverOrder(DeliverOrderEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deliver_event_serializes_status_as_screaming_snake_case() {
        let event = DeliverOrderEvent {
            order_id: "pkg-1".to_string(),
            courier_id: "courier-1".to_string(),
            status: DeliveryOutcome::Delivered,
            reason: None,
            current_location: LocationPayload { lat: 52.5, lon: 13.4 },
            delivered_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["status"], "DELIVERED");
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn not_delivered_event_carries_a_reason() {
        let event = DeliverOrderEvent {
            order_id: "pkg-1".to_string(),
            courier_id: "courier-1".to_string(),
            status: DeliveryOutcome::NotDelivered,
            reason: Some(NotDeliveredReason::CustomerNotAvailable),
            current_location: LocationPayload { lat: 52.5, lon: 13.4 },
            delivered_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["status"], "NOT_DELIVERED");
        assert_eq!(json["reason"], "CUSTOMER_NOT_AVAILABLE");
    }

    #[test]
    fn simulated_reasons_exclude_package_damaged_and_other() {
        assert!(!NotDeliveredReason::SIMULATED.contains(&NotDeliveredReason::PackageDamaged));
        assert!(!NotDeliveredReason::SIMULATED.contains(&NotDeliveredReason::Other));
        assert_eq!(NotDeliveredReason::SIMULATED.len(), 4);
    }

    #[test]
    fn location_event_omits_optional_fields_when_absent() {
        let event = CourierLocationEvent {
            courier_id: "courier-1".to_string(),
            latitude: 52.5,
            longitude: 13.4,
            timestamp: Utc::now(),
            status: "idle".to_string(),
            speed_kmh: None,
            heading: None,
            route_id: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("speed_kmh").is_none());
        assert!(json.get("heading").is_none());
        assert!(json.get("route_id").is_none());
    }
}
