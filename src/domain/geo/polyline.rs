//! Google polyline codec (1e5 precision).
//!
//! Encodes/decodes a sequence of [`Location`] values into the compact ASCII
//! format used by most road-routing APIs: signed delta-coded coordinates,
//! zigzag-encoded into unsigned integers, emitted as 5-bit groups offset by 63.

use super::location::{Location, LocationError};

const PRECISION: f64 = 1e5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolylineError {
    #[error("polyline is empty")]
    Empty,
    #[error("truncated polyline: varint ended without a terminating byte")]
    Truncated,
    #[error(transparent)]
    InvalidCoordinate(#[from] LocationError),
}

/// An opaque, non-empty encoded polyline string.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline(String);

impl Polyline {
    pub fn new(encoded: String) -> Result<Self, PolylineError> {
        if encoded.is_empty() {
            return Err(PolylineError::Empty);
        }
        Ok(Self(encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes into an ordered sequence of points.
    pub fn decode(&self) -> Result<Vec<Location>, PolylineError> {
        decode(&self.0)
    }

    /// Encodes a non-empty point sequence into a polyline.
    ///
    /// Callers outside this module should go through `Route::minimal` rather
    /// than calling this directly; kept `pub(crate)` to keep the encoding
    /// concern colocated with decoding.
    pub(crate) fn encode(points: &[Location]) -> Self {
        Self(encode(points))
    }
}

fn encode(points: &[Location]) -> String {
    let mut output = String::new();
    let mut prev_lat = 0i64;
    let mut prev_lon = 0i64;

    for point in points {
        let lat = (point.latitude() * PRECISION).round() as i64;
        let lon = (point.longitude() * PRECISION).round() as i64;

        encode_value(lat - prev_lat, &mut output);
        encode_value(lon - prev_lon, &mut output);

        prev_lat = lat;
        prev_lon = lon;
    }

    output
}

fn encode_value(value: i64, output: &mut String) {
    let mut shifted = value << 1;
    if value < 0 {
        shifted = !shifted;
    }

    while shifted >= 0x20 {
        let chunk = ((shifted & 0x1f) | 0x20) as u8 + 63;
        output.push(chunk as char);
        shifted >>= 5;
    }
    output.push((shifted as u8 + 63) as char);
}

fn decode(encoded: &str) -> Result<Vec<Location>, PolylineError> {
    if encoded.is_empty() {
        return Err(PolylineError::Empty);
    }

    let bytes = encoded.as_bytes();
    let mut index = 0usize;
    let mut lat = 0i64;
    let mut lon = 0i64;
    let mut points = Vec::new();

    while index < bytes.len() {
        let delta_lat = decode_value(bytes, &mut index)?;
        let delta_lon = decode_value(bytes, &mut index)?;

        lat += delta_lat;
        lon += delta_lon;

        let latitude = lat as f64 / PRECISION;
        let longitude = lon as f64 / PRECISION;
        points.push(Location::new(latitude, longitude)?);
    }

    Ok(points)
}

fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*index).ok_or(PolylineError::Truncated)?;
        *index += 1;

        let chunk = (byte as i64 - 63) & 0x1f;
        result |= chunk << shift;
        shift += 5;

        if (byte as i64 - 63) < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

/// Encodes the given non-empty point sequence into a polyline.
pub fn encode_points(points: &[Location]) -> Result<Polyline, PolylineError> {
    if points.is_empty() {
        return Err(PolylineError::Empty);
    }
    Ok(Polyline::encode(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_canonical_example() {
        // E6 — Google's own documented example.
        let polyline = Polyline::new("_p~iF~ps|U_ulLnnqC_mqNvxq`@".to_string()).unwrap();
        let points = polyline.decode().unwrap();

        assert_eq!(points.len(), 3);
        assert!((points[0].latitude() - 38.5).abs() < 0.01);
        assert!((points[0].longitude() + 120.2).abs() < 0.01);
        assert!((points[1].latitude() - 40.7).abs() < 0.01);
        assert!((points[1].longitude() + 120.95).abs() < 0.01);
        assert!((points[2].latitude() - 43.252).abs() < 0.01);
        assert!((points[2].longitude() + 126.453).abs() < 0.01);
    }

    #[test]
    fn encode_decode_round_trip() {
        let points = vec![
            Location::new(52.517037, 13.388860).unwrap(),
            Location::new(52.529407, 13.397634).unwrap(),
            Location::new(52.52, 13.40).unwrap(),
        ];
        let encoded = encode_points(&points).unwrap();
        let decoded = encoded.decode().unwrap();

        assert_eq!(decoded.len(), points.len());
        for (original, round_tripped) in points.iter().zip(decoded.iter()) {
            assert!((original.latitude() - round_tripped.latitude()).abs() < 1e-5);
            assert!((original.longitude() - round_tripped.longitude()).abs() < 1e-5);
        }
    }

    #[test]
    fn single_point_round_trips() {
        let points = vec![Location::new(0.0, 0.0).unwrap()];
        let encoded = encode_points(&points).unwrap();
        let decoded = encoded.decode().unwrap();
        assert_eq!(decoded, points);
    }

    #[test]
    fn negative_coordinates_round_trip() {
        let points = vec![
            Location::new(-33.865143, 151.209900).unwrap(),
            Location::new(-37.813629, 144.963058).unwrap(),
        ];
        let encoded = encode_points(&points).unwrap();
        let decoded = encoded.decode().unwrap();
        for (original, round_tripped) in points.iter().zip(decoded.iter()) {
            assert!((original.latitude() - round_tripped.latitude()).abs() < 1e-5);
            assert!((original.longitude() - round_tripped.longitude()).abs() < 1e-5);
        }
    }

    #[test]
    fn rejects_empty_polyline() {
        assert!(matches!(Polyline::new(String::new()), Err(PolylineError::Empty)));
        assert!(matches!(encode_points(&[]), Err(PolylineError::Empty)));
    }

    #[test]
    fn rejects_truncated_varint() {
        // A single continuation byte with the high bit set and nothing after it.
        let polyline = Polyline::new("~".to_string()).unwrap();
        assert!(matches!(polyline.decode(), Err(PolylineError::Truncated)));
    }
}
