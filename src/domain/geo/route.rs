use chrono::{DateTime, Utc};

use super::location::Location;
use super::polyline::{encode_points, Polyline, PolylineError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("route distance must be positive, got {0}")]
    InvalidDistance(f64),
    #[error("route duration must be positive, got {0}")]
    InvalidDuration(f64),
    #[error(transparent)]
    Polyline(#[from] PolylineError),
}

/// A routing-service response: an ordered polyline with total distance and duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    id: String,
    origin: Location,
    destination: Location,
    polyline: Polyline,
    distance_m: f64,
    duration_s: f64,
    created_at: DateTime<Utc>,
}

impl Route {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        origin: Location,
        destination: Location,
        polyline: Polyline,
        distance_m: f64,
        duration_s: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RouteError> {
        if distance_m <= 0.0 {
            return Err(RouteError::InvalidDistance(distance_m));
        }
        if duration_s <= 0.0 {
            return Err(RouteError::InvalidDuration(duration_s));
        }
        Ok(Self {
            id,
            origin,
            destination,
            polyline,
            distance_m,
            duration_s,
            created_at,
        })
    }

    /// Builds a synthetic two-point route between `origin` and `destination`.
    ///
    /// Used as the delivery-leg fallback when the routing service is
    /// unavailable: distance is the great-circle distance, computed in
    /// kilometres and then multiplied by 1000 to produce metres, and
    /// duration is derived from `distance / speed`.
    pub fn minimal(
        id: String,
        origin: Location,
        destination: Location,
        speed_kmh: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RouteError> {
        let distance_km = origin.distance_to(&destination);
        let distance_m = distance_km * 1000.0;

        // A zero-distance minimal route (identical pickup/delivery points) still
        // needs a strictly positive distance/duration per the Route invariant;
        // floor both at a negligible but positive value rather than reject it.
        let distance_m = distance_m.max(1.0);
        let duration_s = if speed_kmh > 0.0 {
            (distance_km / speed_kmh * 3600.0).max(1.0)
        } else {
            1.0
        };

        let polyline = encode_points(&[origin, destination])?;

        Self::new(id, origin, destination, polyline, distance_m, duration_s, created_at)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> Location {
        self.origin
    }

    pub fn destination(&self) -> Location {
        self.destination
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    /// Decodes this route's polyline into its ordered point sequence.
    pub fn points(&self) -> Result<Vec<Location>, PolylineError> {
        self.polyline.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin_pair() -> (Location, Location) {
        (
            Location::new(52.517037, 13.388860).unwrap(),
            Location::new(52.529407, 13.397634).unwrap(),
        )
    }

    #[test]
    fn rejects_non_positive_distance() {
        let (origin, destination) = berlin_pair();
        let polyline = encode_points(&[origin, destination]).unwrap();
        let result = Route::new(
            "route_000001".to_string(),
            origin,
            destination,
            polyline,
            0.0,
            60.0,
            Utc::now(),
        );
        assert!(matches!(result, Err(RouteError::InvalidDistance(_))));
    }

    #[test]
    fn rejects_non_positive_duration() {
        let (origin, destination) = berlin_pair();
        let polyline = encode_points(&[origin, destination]).unwrap();
        let result = Route::new(
            "route_000001".to_string(),
            origin,
            destination,
            polyline,
            100.0,
            0.0,
            Utc::now(),
        );
        assert!(matches!(result, Err(RouteError::InvalidDuration(_))));
    }

    #[test]
    fn minimal_route_computes_distance_in_metres() {
        let (origin, destination) = berlin_pair();
        let route = Route::minimal("route_000002".to_string(), origin, destination, 30.0, Utc::now()).unwrap();

        let distance_km = origin.distance_to(&destination);
        // Explicit regression for the km->m unit-confusion hotspot: the stored
        // distance must be the kilometre figure scaled by 1000, not left in km.
        assert!((route.distance_m() - distance_km * 1000.0).abs() < 1e-6);
        assert!(route.distance_m() > 100.0, "expected metres, got {}", route.distance_m());
    }

    #[test]
    fn minimal_route_identical_endpoints_stays_positive() {
        let (origin, _) = berlin_pair();
        let route = Route::minimal("route_000003".to_string(), origin, origin, 30.0, Utc::now()).unwrap();
        assert!(route.distance_m() > 0.0);
        assert!(route.duration_s() > 0.0);
    }

    #[test]
    fn minimal_route_points_decode_to_endpoints() {
        let (origin, destination) = berlin_pair();
        let route = Route::minimal("route_000004".to_string(), origin, destination, 30.0, Utc::now()).unwrap();
        let points = route.points().unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[0].latitude() - origin.latitude()).abs() < 1e-5);
        assert!((points[1].latitude() - destination.latitude()).abs() < 1e-5);
    }
}
