// src/models/location.rs
// DOCUMENTATION: Geographic primitives
// PURPOSE: Resolved search location and coordinate pairs

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and within -90..90 / -180..180
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// "lat,lng" as expected by provider query strings
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// GeoJSON ordering: x = longitude, y = latitude
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A user's location query after geocoding
/// DOCUMENTATION: Created once per search and never mutated afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Text the user typed
    pub query: String,
    /// Resolved center point
    pub coordinates: Coordinates,
    /// Provider formatted address of the first candidate
    pub display_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_ranges() {
        assert!(Coordinates::new(42.3601, -71.0589).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.5, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -181.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_point_uses_lng_lat_order() {
        let point = Coordinates::new(42.36, -71.05).to_point();
        assert_eq!(point.x(), -71.05);
        assert_eq!(point.y(), 42.36);
    }
}
