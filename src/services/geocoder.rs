// src/services/geocoder.rs
// DOCUMENTATION: Location text to coordinates
// PURPOSE: Nominatim and Google geocoders behind one trait, fronted by a cache

use crate::config::{Config, GeocoderKind};
use crate::errors::PlacesError;
use crate::models::{Coordinates, Location};
use crate::services::cache::GeocodeCache;
use crate::services::provider::{
    build_request, fetch_json, http_client, rate_limiter, DirectRateLimiter,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Resolves free text to the first candidate location
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, text: &str) -> Result<Location, PlacesError>;
}

/// Parse a literal "lat,lng" pair
pub fn parse_coordinates(text: &str) -> Option<Coordinates> {
    let (lat, lng) = text.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    Some(Coordinates::new(lat, lng))
}

fn geocode_failure(text: &str, reason: impl std::fmt::Display) -> PlacesError {
    PlacesError::GeocodeFailure(format!("{}: {}", text, reason))
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// OpenStreetMap Nominatim geocoder
pub struct NominatimGeocoder {
    client: Client,
    limiter: DirectRateLimiter,
}

impl NominatimGeocoder {
    /// Nominatim requires an identifying User-Agent and at most 1 request per second
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, PlacesError> {
        Ok(Self {
            client: http_client(timeout, user_agent)?,
            limiter: rate_limiter(1),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, text: &str) -> Result<Location, PlacesError> {
        let request = build_request(
            self.client
                .get(NOMINATIM_SEARCH_URL)
                .query(&[("q", text), ("format", "json"), ("limit", "1")]),
            "Nominatim",
        )?;

        let places: Vec<NominatimPlace> =
            fetch_json(&self.client, &self.limiter, request, "Nominatim")
                .await
                .map_err(|e| geocode_failure(text, e))?;

        let first = places
            .into_iter()
            .next()
            .ok_or_else(|| geocode_failure(text, "no candidates"))?;

        let latitude: f64 = first
            .lat
            .parse()
            .map_err(|_| geocode_failure(text, "unparseable latitude"))?;
        let longitude: f64 = first
            .lon
            .parse()
            .map_err(|_| geocode_failure(text, "unparseable longitude"))?;

        Ok(Location {
            query: text.to_string(),
            coordinates: Coordinates::new(latitude, longitude),
            display_address: first.display_name.unwrap_or_else(|| text.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResponse {
    #[serde(default)]
    results: Vec<GoogleGeocodeResult>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResult {
    formatted_address: Option<String>,
    geometry: GoogleGeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeGeometry {
    location: GoogleLatLng,
}

#[derive(Debug, Deserialize)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

/// Google Geocoding API
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    limiter: DirectRateLimiter,
}

impl GoogleGeocoder {
    pub fn new(
        api_key: String,
        timeout: Duration,
        requests_per_second: u32,
    ) -> Result<Self, PlacesError> {
        Ok(Self {
            client: http_client(timeout, "sensory-places")?,
            api_key,
            limiter: rate_limiter(requests_per_second),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, text: &str) -> Result<Location, PlacesError> {
        let request = build_request(
            self.client
                .get(GOOGLE_GEOCODE_URL)
                .query(&[("address", text), ("key", self.api_key.as_str())]),
            "Google geocode",
        )?;

        let response: GoogleGeocodeResponse =
            fetch_json(&self.client, &self.limiter, request, "Google geocode")
                .await
                .map_err(|e| geocode_failure(text, e))?;

        if response.status != "OK" {
            return Err(geocode_failure(text, format!("status {}", response.status)));
        }

        let first = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| geocode_failure(text, "no candidates"))?;

        Ok(Location {
            query: text.to_string(),
            coordinates: Coordinates::new(
                first.geometry.location.lat,
                first.geometry.location.lng,
            ),
            display_address: first.formatted_address.unwrap_or_else(|| text.to_string()),
        })
    }
}

/// Front door used by the pipeline
/// DOCUMENTATION: Empty text fails without a network call, literal
/// coordinates skip the remote geocoder, and only valid results are cached
pub struct CachedGeocoder {
    inner: Arc<dyn Geocoder>,
    cache: Arc<GeocodeCache>,
}

impl CachedGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>, cache: Arc<GeocodeCache>) -> Self {
        Self { inner, cache }
    }

    /// Build the configured remote geocoder wrapped in the shared cache
    pub fn from_config(config: &Config, cache: Arc<GeocodeCache>) -> Result<Self, PlacesError> {
        let inner: Arc<dyn Geocoder> = match config.geocoder {
            GeocoderKind::Nominatim => Arc::new(NominatimGeocoder::new(
                &config.nominatim_user_agent,
                config.provider_timeout(),
            )?),
            GeocoderKind::Google => {
                if config.google_maps_api_key.is_empty() {
                    return Err(PlacesError::Configuration(
                        "GOOGLE_MAPS_API_KEY is required for the google geocoder".to_string(),
                    ));
                }
                Arc::new(GoogleGeocoder::new(
                    config.google_maps_api_key.clone(),
                    config.provider_timeout(),
                    config.provider_requests_per_second,
                )?)
            }
        };
        Ok(Self::new(inner, cache))
    }
}

#[async_trait]
impl Geocoder for CachedGeocoder {
    async fn geocode(&self, text: &str) -> Result<Location, PlacesError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(geocode_failure(text, "empty location"));
        }

        if let Some(coordinates) = parse_coordinates(text) {
            if !coordinates.is_valid() {
                return Err(geocode_failure(text, "coordinates out of range"));
            }
            return Ok(Location {
                query: text.to_string(),
                coordinates,
                display_address: coordinates.to_query_value(),
            });
        }

        if let Some(location) = self.cache.get(text).await {
            return Ok(location);
        }

        let location = self.inner.geocode(text).await?;
        if !location.coordinates.is_valid() {
            return Err(geocode_failure(text, "geocoder returned invalid coordinates"));
        }

        log::info!(
            "Geocoded '{}' to {} ({})",
            text,
            location.coordinates.to_query_value(),
            location.display_address
        );
        self.cache.set(text, location.clone()).await;
        Ok(location)
    }
}
