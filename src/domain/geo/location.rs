use std::fmt;

/// Valid latitude range in degrees.
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
/// Valid longitude range in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geodetic point.
///
/// A value object: immutable, and equal to another `Location` iff both
/// coordinates match exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("invalid latitude: {0}. must be between {MIN_LATITUDE} and {MAX_LATITUDE}")]
    InvalidLatitude(f64),
    #[error("invalid longitude: {0}. must be between {MIN_LONGITUDE} and {MAX_LONGITUDE}")]
    InvalidLongitude(f64),
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(LocationError::InvalidLatitude(latitude));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(LocationError::InvalidLongitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Haversine distance to `other`, in kilometers.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Initial bearing from this point to `other`, in degrees, normalised to `[0, 360)`.
    pub fn bearing_to(&self, other: &Location) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let y = delta_lon.sin() * lat2_rad.cos();
        let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();
        let theta = y.atan2(x).to_degrees();

        (theta + 360.0) % 360.0
    }

    /// Point on the great-circle segment toward `other`, `fraction` of the way there.
    ///
    /// Used for sub-segment advancement within a tick; linear in lat/lon, which is
    /// an acceptable approximation over the short sub-segments of a road polyline.
    pub fn interpolate_toward(&self, other: &Location, fraction: f64) -> Location {
        let fraction = fraction.clamp(0.0, 1.0);
        Location {
            latitude: self.latitude + (other.latitude - self.latitude) * fraction,
            longitude: self.longitude + (other.longitude - self.longitude) * fraction,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(matches!(
            Location::new(MAX_LATITUDE + 1.0, 0.0),
            Err(LocationError::InvalidLatitude(_))
        ));
        assert!(matches!(
            Location::new(MIN_LATITUDE - 1.0, 0.0),
            Err(LocationError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert!(matches!(
            Location::new(0.0, MAX_LONGITUDE + 1.0),
            Err(LocationError::InvalidLongitude(_))
        ));
        assert!(matches!(
            Location::new(0.0, MIN_LONGITUDE - 1.0),
            Err(LocationError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(Location::new(MAX_LATITUDE, MAX_LONGITUDE).is_ok());
        assert!(Location::new(MIN_LATITUDE, MIN_LONGITUDE).is_ok());
    }

    #[test]
    fn distance_zero_at_equality() {
        let berlin = Location::new(52.517037, 13.388860).unwrap();
        assert_eq!(berlin.distance_to(&berlin), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Location::new(52.517037, 13.388860).unwrap();
        let b = Location::new(52.529407, 13.397634).unwrap();
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
    }

    #[test]
    fn distance_matches_known_value() {
        // Berlin Brandenburg Gate to Alexanderplatz, roughly 1.9 km apart.
        let a = Location::new(52.517037, 13.388860).unwrap();
        let b = Location::new(52.521918, 13.413215).unwrap();
        let d = a.distance_to(&b);
        assert!((1.0..3.0).contains(&d), "unexpected distance: {d}");
    }

    #[test]
    fn distance_antipodal_points_half_circumference() {
        let a = Location::new(0.0, 0.0).unwrap();
        let b = Location::new(0.0, 180.0).unwrap();
        let d = a.distance_to(&b);
        assert!((19000.0..21000.0).contains(&d));
    }

    #[test]
    fn bearing_due_east_is_90() {
        let a = Location::new(0.0, 0.0).unwrap();
        let b = Location::new(0.0, 10.0).unwrap();
        let bearing = a.bearing_to(&b);
        assert!((bearing - 90.0).abs() < 0.01, "bearing was {bearing}");
    }

    #[test]
    fn bearing_due_north_is_zero() {
        let a = Location::new(0.0, 0.0).unwrap();
        let b = Location::new(10.0, 0.0).unwrap();
        let bearing = a.bearing_to(&b);
        assert!(bearing < 0.01 || bearing > 359.99, "bearing was {bearing}");
    }

    #[test]
    fn bearing_is_normalised_non_negative() {
        let a = Location::new(10.0, 0.0).unwrap();
        let b = Location::new(0.0, 0.0).unwrap();
        let bearing = a.bearing_to(&b);
        assert!((0.0..360.0).contains(&bearing));
    }

    #[test]
    fn interpolate_toward_midpoint() {
        let a = Location::new(0.0, 0.0).unwrap();
        let b = Location::new(10.0, 10.0).unwrap();
        let mid = a.interpolate_toward(&b, 0.5);
        assert!((mid.latitude() - 5.0).abs() < 1e-9);
        assert!((mid.longitude() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn interpolate_toward_clamps_fraction() {
        let a = Location::new(0.0, 0.0).unwrap();
        let b = Location::new(10.0, 10.0).unwrap();
        assert_eq!(a.interpolate_toward(&b, 2.0), b);
        assert_eq!(a.interpolate_toward(&b, -1.0), a);
    }
}
