// src/config/catalog.rs
// DOCUMENTATION: Provider selection, keyword lists and category catalogs
// PURPOSE: Injectable search/classifier configuration instead of module-level constants

use std::fmt;
use std::str::FromStr;

/// Keywords OR-combined into the provider search query
pub const DEFAULT_SENSORY_KEYWORDS: &[&str] = &[
    "quiet",
    "calm",
    "low lighting",
    "soft music",
    "not crowded",
    "spacious",
    "gentle lighting",
    "low noise",
    "comfortable seating",
    "sensory friendly",
];

/// Keywords that hint at a physically accessible place
pub const DEFAULT_ACCESSIBILITY_KEYWORDS: &[&str] = &[
    "wheelchair",
    "accessible",
    "ramp",
    "elevator",
    "wide doors",
    "barrier-free",
    "ADA",
    "mobility",
];

/// Sender domains accepted by the contact form
pub const DEFAULT_CONTACT_DOMAINS: &[&str] = &[".com", ".net", ".edu"];

/// Foursquare category IDs by display name
/// https://docs.foursquare.com/data-products/docs/categories
pub const FOURSQUARE_CATEGORIES: &[(&str, &str)] = &[
    ("Restaurant", "4d4b7105d754a06374d81259"),
    ("Cafe", "4bf58dd8d48988d16d941735"),
    ("Retail", "4d4b7105d754a06378d81259"),
    ("Sports & Rec", "4f4528bc4b90abdf24c9de85"),
    ("Park", "4bf58dd8d48988d163941735"),
    ("Library", "4bf58dd8d48988d12f941735"),
    ("Movie Theater", "4bf58dd8d48988d17f941735"),
    ("Museum", "4bf58dd8d48988d181941735"),
    ("Hospital", "4bf58dd8d48988d196941735"),
    ("Places of Worship", "4bf58dd8d48988d131941735"),
    ("Zoo", "4bf58dd8d48988d17b941735"),
    ("Aquarium", "4fceea171983d5d06c3e9823"),
    ("Airport", "4bf58dd8d48988d1ed931735"),
];

/// Google place types usable as a nearby search `type` filter
/// https://developers.google.com/maps/documentation/places/web-service/supported_types
pub const GOOGLE_PLACE_TYPES: &[&str] = &[
    "airport",
    "amusement_park",
    "aquarium",
    "art_gallery",
    "bakery",
    "bar",
    "book_store",
    "bowling_alley",
    "cafe",
    "campground",
    "church",
    "clothing_store",
    "department_store",
    "dentist",
    "doctor",
    "gym",
    "hair_care",
    "hindu_temple",
    "hospital",
    "library",
    "meal_takeaway",
    "mosque",
    "movie_theater",
    "museum",
    "park",
    "pharmacy",
    "restaurant",
    "shopping_mall",
    "spa",
    "stadium",
    "store",
    "supermarket",
    "synagogue",
    "tourist_attraction",
    "university",
    "zoo",
];

/// Places data provider backing search and enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Foursquare,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Foursquare => "foursquare",
            Provider::Google => "google",
        }
    }

    /// Photo size token used when building photo URLs
    /// Foursquare expects WIDTHxHEIGHT, Google a max width in pixels
    pub fn default_photo_size(&self) -> &'static str {
        match self {
            Provider::Foursquare => "300x300",
            Provider::Google => "400",
        }
    }

    /// Geocoder paired with this provider when none is configured
    pub fn default_geocoder(&self) -> GeocoderKind {
        match self {
            Provider::Foursquare => GeocoderKind::Nominatim,
            Provider::Google => GeocoderKind::Google,
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "foursquare" | "fsq" => Ok(Provider::Foursquare),
            "google" | "google_maps" => Ok(Provider::Google),
            other => Err(format!("unknown places provider '{}'", other)),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geocoding backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocoderKind {
    /// OpenStreetMap Nominatim search
    Nominatim,
    /// Google Geocoding API
    Google,
}

impl FromStr for GeocoderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nominatim" | "osm" => Ok(GeocoderKind::Nominatim),
            "google" => Ok(GeocoderKind::Google),
            other => Err(format!("unknown geocoder '{}'", other)),
        }
    }
}

/// How the accessibility flag is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessibilityStrategy {
    /// Keyword match over place text and reviews only
    Keywords,
    /// Provider attribute only; absent attribute means not accessible
    ProviderFlag,
    /// Provider attribute when present, keyword match otherwise
    PreferProviderFlag,
}

impl FromStr for AccessibilityStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keywords" | "keyword" => Ok(AccessibilityStrategy::Keywords),
            "provider_flag" | "flag" => Ok(AccessibilityStrategy::ProviderFlag),
            "prefer_provider_flag" | "auto" => Ok(AccessibilityStrategy::PreferProviderFlag),
            other => Err(format!("unknown accessibility strategy '{}'", other)),
        }
    }
}

/// Settings handed to the place search clients
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Keywords OR-combined into the query
    pub sensory_keywords: Vec<String>,
    /// Maximum number of places returned (never above 10)
    pub result_limit: usize,
}

impl SearchSettings {
    /// Keyword expression sent to the provider, e.g. "quiet OR calm"
    /// Left unencoded; the HTTP client encodes query parameters once.
    pub fn keyword_query(&self) -> String {
        self.sensory_keywords.join(" OR ")
    }
}

/// Settings handed to the enrichment clients
#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    /// Fixed size token inserted into photo URLs
    pub photo_size: String,
    /// Photos requested per place
    pub photo_limit: usize,
    /// Reviews/tips requested per place
    pub review_limit: usize,
}

/// Settings handed to the accessibility classifier
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub accessibility_keywords: Vec<String>,
    pub sensory_keywords: Vec<String>,
    pub strategy: AccessibilityStrategy,
}

/// Category display names resolved to provider identifiers
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: Vec<(String, String)>,
}

impl CategoryCatalog {
    /// Build the catalog for a provider
    pub fn for_provider(provider: Provider) -> Self {
        let entries = match provider {
            Provider::Foursquare => FOURSQUARE_CATEGORIES
                .iter()
                .map(|(name, id)| (name.to_string(), id.to_string()))
                .collect(),
            Provider::Google => GOOGLE_PLACE_TYPES
                .iter()
                .map(|t| (Self::display_name(t), t.to_string()))
                .collect(),
        };
        Self { entries }
    }

    /// Resolve a display name (or a raw provider identifier) case-insensitively
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|(display, id)| display.to_lowercase() == wanted || id.to_lowercase() == wanted)
            .map(|(_, id)| id.as_str())
    }

    /// Display names for a category dropdown
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// "movie_theater" -> "Movie Theater"
    fn display_name(google_type: &str) -> String {
        google_type
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Foursquare".parse::<Provider>(), Ok(Provider::Foursquare));
        assert_eq!("google".parse::<Provider>(), Ok(Provider::Google));
        assert!("yelp".parse::<Provider>().is_err());
    }

    #[test]
    fn test_foursquare_catalog_resolves_display_names() {
        let catalog = CategoryCatalog::for_provider(Provider::Foursquare);

        assert_eq!(catalog.resolve("Restaurant"), Some("4d4b7105d754a06374d81259"));
        assert_eq!(catalog.resolve("movie theater"), Some("4bf58dd8d48988d17f941735"));
        assert_eq!(catalog.resolve("Nightclub"), None);
        assert_eq!(catalog.resolve("  "), None);
    }

    #[test]
    fn test_google_catalog_resolves_types_and_names() {
        let catalog = CategoryCatalog::for_provider(Provider::Google);

        assert_eq!(catalog.resolve("Restaurant"), Some("restaurant"));
        assert_eq!(catalog.resolve("Movie Theater"), Some("movie_theater"));
        assert_eq!(catalog.resolve("art_gallery"), Some("art_gallery"));
        assert!(catalog.names().contains(&"Amusement Park"));
    }

    #[test]
    fn test_keyword_query_is_or_combined_and_unencoded() {
        let settings = SearchSettings {
            sensory_keywords: vec!["quiet".to_string(), "low lighting".to_string()],
            result_limit: 10,
        };

        assert_eq!(settings.keyword_query(), "quiet OR low lighting");
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "prefer_provider_flag".parse::<AccessibilityStrategy>(),
            Ok(AccessibilityStrategy::PreferProviderFlag)
        );
        assert_eq!(
            "Keywords".parse::<AccessibilityStrategy>(),
            Ok(AccessibilityStrategy::Keywords)
        );
        assert!("magic".parse::<AccessibilityStrategy>().is_err());
    }
}
