use rand::Rng;

use super::location::{Location, LocationError};

/// An axis-aligned lat/lon box used only for synthetic route generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum BoundingBoxError {
    #[error("invalid bounding box: min_lat ({min_lat}) must be < max_lat ({max_lat})")]
    InvalidLatitudeRange { min_lat: f64, max_lat: f64 },
    #[error("invalid bounding box: min_lon ({min_lon}) must be < max_lon ({max_lon})")]
    InvalidLongitudeRange { min_lon: f64, max_lon: f64 },
    #[error(transparent)]
    Location(#[from] LocationError),
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self, BoundingBoxError> {
        if min_lat >= max_lat {
            return Err(BoundingBoxError::InvalidLatitudeRange { min_lat, max_lat });
        }
        if min_lon >= max_lon {
            return Err(BoundingBoxError::InvalidLongitudeRange { min_lon, max_lon });
        }
        // Validate that the corners themselves are legal coordinates.
        Location::new(min_lat, min_lon)?;
        Location::new(max_lat, max_lon)?;

        Ok(Self { min_lat, max_lat, min_lon, max_lon })
    }

    /// A uniformly-sampled point within the box.
    pub fn sample(&self, rng: &mut impl Rng) -> Location {
        let lat = rng.random_range(self.min_lat..self.max_lat);
        let lon = rng.random_range(self.min_lon..self.max_lon);
        Location::new(lat, lon).expect("bounding box invariants guarantee a valid sample")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rejects_inverted_latitude_range() {
        assert!(matches!(
            BoundingBox::new(10.0, 5.0, 0.0, 1.0),
            Err(BoundingBoxError::InvalidLatitudeRange { .. })
        ));
    }

    #[test]
    fn rejects_inverted_longitude_range() {
        assert!(matches!(
            BoundingBox::new(0.0, 1.0, 10.0, 5.0),
            Err(BoundingBoxError::InvalidLongitudeRange { .. })
        ));
    }

    #[test]
    fn sample_stays_within_bounds() {
        let bbox = BoundingBox::new(52.4, 52.6, 13.3, 13.5).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let point = bbox.sample(&mut rng);
            assert!((52.4..52.6).contains(&point.latitude()));
            assert!((13.3..13.5).contains(&point.longitude()));
        }
    }
}
