// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Normalized provider records, view models and search DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Coordinates, Location, Review};

/// Name shown when the provider omits one
pub const UNKNOWN_PLACE_NAME: &str = "Unknown Place";

/// Address shown when the provider omits one
pub const UNKNOWN_ADDRESS: &str = "Address not available";

/// Meters per mile used for radius conversion
pub const METERS_PER_MILE: u32 = 1609;

/// Caveat attached to every search response
pub const ACCESSIBILITY_ADVISORY: &str = "Sensory-friendly and accessibility flags are inferred from keywords and provider data. They are hints, not verified accessibility information.";

/// One normalized search result
/// DOCUMENTATION: Produced by the typed parsing step at the provider boundary.
/// `id` is the natural key within one search batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    /// Provider-assigned identifier (fsq_id or Google place_id)
    pub id: String,

    /// Place name ("Unknown Place" when missing)
    pub name: String,

    /// Street address or vicinity ("Address not available" when missing)
    pub address: String,

    /// Coordinates, absent when the provider gave none
    pub coordinates: Option<Coordinates>,

    /// Provider description text, when available
    pub description: Option<String>,

    /// Explicit provider accessibility attribute, when available
    pub wheelchair_accessible: Option<bool>,

    /// Rating on the provider's scale
    pub rating: Option<f32>,

    /// Number of ratings behind `rating`
    pub rating_count: Option<u32>,
}

impl PlaceSummary {
    /// Summary with fallbacks applied to missing name/address
    pub fn new(
        id: String,
        name: Option<String>,
        address: Option<String>,
        coordinates: Option<Coordinates>,
    ) -> Self {
        Self {
            id,
            name: non_blank(name).unwrap_or_else(|| UNKNOWN_PLACE_NAME.to_string()),
            address: non_blank(address).unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            coordinates: coordinates.filter(Coordinates::is_valid),
            description: None,
            wheelchair_accessible: None,
            rating: None,
            rating_count: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Search parameters handed to a place search client
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    /// Search radius in meters
    pub radius_m: u32,
    /// Provider category identifier (Foursquare category ID or Google type)
    pub category: Option<String>,
}

/// Where an accessibility decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessibilitySource {
    /// Provider exposed an explicit attribute
    ProviderAttribute,
    /// A configured keyword matched place text or reviews
    Keywords,
    /// No signal at all; reported as not accessible
    NoSignal,
}

/// Classifier output for one place
#[derive(Debug, Clone, PartialEq)]
pub struct AccessibilityVerdict {
    pub accessible: bool,
    pub source: AccessibilitySource,
    /// Sensory keywords found in the place's text or reviews
    pub sensory_matches: Vec<String>,
}

impl Default for AccessibilityVerdict {
    fn default() -> Self {
        Self {
            accessible: false,
            source: AccessibilitySource::NoSignal,
            sensory_matches: Vec::new(),
        }
    }
}

/// View model handed to list and map rendering
/// DOCUMENTATION: Summary + media + advisory flags for one place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub rating: Option<f32>,
    pub rating_count: Option<u32>,

    /// First photo, for list thumbnails
    pub photo_url: Option<String>,
    pub photos: Vec<String>,
    pub reviews: Vec<Review>,

    /// Advisory only, never certified accessibility information
    pub accessible: bool,
    pub accessibility_source: AccessibilitySource,

    /// Sensory keywords that matched, explaining why the place was flagged
    pub sensory_matches: Vec<String>,
}

/// Query string of GET /places/search
/// DOCUMENTATION: `location` has no minimum length;
/// an empty location flows to the geocoder and yields a geocode failure
#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    /// Free text: city, address or "lat,lng"
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: String,

    /// Radius in meters
    #[validate(range(min = 1, max = 50000))]
    pub radius_m: Option<u32>,

    /// Radius in miles (used when radius_m is absent)
    #[validate(range(min = 1, max = 31))]
    pub radius_miles: Option<u32>,

    /// Category display name, e.g. "Restaurant"
    pub category: Option<String>,
}

impl SearchQuery {
    /// Effective radius in meters
    pub fn radius_meters(&self, default_radius_m: u32) -> u32 {
        self.radius_m
            .or_else(|| self.radius_miles.map(|miles| miles * METERS_PER_MILE))
            .unwrap_or(default_radius_m)
    }
}

/// Map payload for the map-rendering collaborator
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
    /// GeoJSON FeatureCollection, one Point feature per place with coordinates
    pub markers: geojson::FeatureCollection,
}

/// Response of GET /places/search
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub location: Location,
    pub radius_m: u32,
    pub category: Option<String>,
    pub places: Vec<PlaceView>,
    pub map: MapView,
    pub advisory: &'static str,
    pub searched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_fallbacks() {
        let summary = PlaceSummary::new("abc".to_string(), None, Some("".to_string()), None);

        assert_eq!(summary.name, "Unknown Place");
        assert_eq!(summary.address, "Address not available");
        assert!(summary.coordinates.is_none());
    }

    #[test]
    fn test_summary_drops_invalid_coordinates() {
        let summary = PlaceSummary::new(
            "abc".to_string(),
            Some("Cafe".to_string()),
            None,
            Some(Coordinates::new(200.0, 10.0)),
        );

        assert!(summary.coordinates.is_none());
    }

    #[test]
    fn test_radius_resolution() {
        let mut query = SearchQuery {
            location: "Boston, MA".to_string(),
            radius_m: None,
            radius_miles: Some(2),
            category: None,
        };
        assert_eq!(query.radius_meters(1609), 3218);

        query.radius_m = Some(500);
        assert_eq!(query.radius_meters(1609), 500);

        query.radius_m = None;
        query.radius_miles = None;
        assert_eq!(query.radius_meters(1609), 1609);
    }

    #[test]
    fn test_query_validation() {
        let query = SearchQuery {
            location: "Boston, MA".to_string(),
            radius_m: Some(80_000),
            radius_miles: None,
            category: None,
        };
        assert!(query.validate().is_err());

        let query = SearchQuery {
            location: String::new(),
            radius_m: Some(1609),
            radius_miles: None,
            category: None,
        };
        assert!(query.validate().is_ok());
    }
}
