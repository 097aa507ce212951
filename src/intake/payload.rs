use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `{lat, lon, ...}` as carried on the assignment payload; extra fields
/// (street address, city, …) are accepted and ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressPayload {
    pub lat: f64,
    pub lon: f64,
}

/// The inbound `delivery.order.assigned.v1` payload (§6.1).
#[derive(Debug, Clone, Deserialize)]
pub struct OrderAssignedPayload {
    pub package_id: String,
    pub courier_id: String,
    pub assigned_at: DateTime<Utc>,
    pub pickup_address: AddressPayload,
    pub delivery_address: AddressPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_the_documented_shape() {
        let json = r#"{
            "package_id": "pkg-1",
            "courier_id": "courier-1",
            "assigned_at": "2026-01-01T00:00:00Z",
            "pickup_address": {"lat": 52.5, "lon": 13.4, "street": "ignored"},
            "delivery_address": {"lat": 52.6, "lon": 13.5}
        }"#;
        let payload: OrderAssignedPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.package_id, "pkg-1");
        assert_eq!(payload.pickup_address.lat, 52.5);
    }
}
