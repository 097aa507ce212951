use chrono::{DateTime, Utc};

use super::geo::Location;

/// `order_id` and `package_id` coincide in this domain; the field is kept
/// distinct from `order_id` only because emitted events carry both names.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOrder {
    pub order_id: String,
    pub package_id: String,
    pub pickup_location: Location,
    pub delivery_location: Location,
    pub assigned_at: DateTime<Utc>,
}

impl DeliveryOrder {
    pub fn new(
        order_id: String,
        package_id: String,
        pickup_location: Location,
        delivery_location: Location,
        assigned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            package_id,
            pickup_location,
            delivery_location,
            assigned_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_and_package_id_are_independent_fields_but_equal_in_practice() {
        let order = DeliveryOrder::new(
            "pkg-1".to_string(),
            "pkg-1".to_string(),
            Location::new(52.5, 13.4).unwrap(),
            Location::new(52.6, 13.5).unwrap(),
            Utc::now(),
        );
        assert_eq!(order.order_id, order.package_id);
    }
}
