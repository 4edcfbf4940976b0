//! Geographic coordinate helpers.
//!
//! Provides the spherical-earth great-circle distance used for fix matching
//! and distance accounting, plus the degree/minute strings printed in the
//! OFP report columns.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Position {
    /// Create a new position.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another position in nautical miles.
    #[inline]
    pub fn distance_nm(&self, other: &Position) -> f64 {
        haversine_nm(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// Haversine great-circle distance between two points in nautical miles.
///
/// # Arguments
///
/// * `lat1`, `lon1` - First point in degrees
/// * `lat2`, `lon2` - Second point in degrees
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards against a > 1.0 from rounding on near-antipodal points
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_NM * c
}

/// Formats a latitude as `N DD MM.m` / `S DD MM.m`.
pub fn format_latitude(latitude: f64) -> String {
    let hemisphere = if latitude < 0.0 { 'S' } else { 'N' };
    let (degrees, minutes) = split_degrees(latitude);
    format!("{} {:02} {:04.1}", hemisphere, degrees, minutes)
}

/// Formats a longitude as `E DDD MM.m` / `W DDD MM.m`.
pub fn format_longitude(longitude: f64) -> String {
    let hemisphere = if longitude < 0.0 { 'W' } else { 'E' };
    let (degrees, minutes) = split_degrees(longitude);
    format!("{} {:03} {:04.1}", hemisphere, degrees, minutes)
}

/// Splits an angle into whole degrees and minutes rounded to a tenth.
///
/// Rounding happens on the tenth-of-minute total so 59.96' carries into the
/// next degree instead of printing as 60.0'.
fn split_degrees(value: f64) -> (u32, f64) {
    let tenths = (value.abs() * 600.0).round() as u64;
    let degrees = (tenths / 600) as u32;
    let minutes = (tenths % 600) as f64 / 10.0;
    (degrees, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        assert_eq!(haversine_nm(36.4, 28.08, 36.4, 28.08), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        // One degree of arc is 60 NM on a 3440.065 NM sphere (within rounding)
        let d = haversine_nm(0.0, 0.0, 1.0, 0.0);
        assert!((d - 60.04).abs() < 0.05, "got {}", d);
    }

    #[test]
    fn test_haversine_rhodes_to_vanes() {
        let d = haversine_nm(36.400, 28.080, 36.385, 27.731);
        assert!((d - 16.9).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_position_distance_is_symmetric() {
        let a = Position::new(36.468, 27.060);
        let b = Position::new(59.651, 17.918);
        assert!((a.distance_nm(&b) - b.distance_nm(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_format_latitude() {
        assert_eq!(format_latitude(36.385), "N 36 23.1");
        assert_eq!(format_latitude(-33.9461), "S 33 56.8");
        assert_eq!(format_latitude(0.0), "N 00 00.0");
    }

    #[test]
    fn test_format_longitude() {
        assert_eq!(format_longitude(27.731), "E 027 43.9");
        assert_eq!(format_longitude(-0.4619), "W 000 27.7");
        assert_eq!(format_longitude(151.177), "E 151 10.6");
    }

    #[test]
    fn test_minutes_carry_into_degrees() {
        // 10.99999° is 10° 59.9994' which rounds up to 11° 00.0'
        assert_eq!(format_latitude(10.99999), "N 11 00.0");
    }
}
