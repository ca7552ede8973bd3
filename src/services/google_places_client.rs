// src/services/google_places_client.rs
// DOCUMENTATION: Google Places API client
// PURPOSE: Nearby keyword search plus photo and review lookups via Place Details

use crate::config::{EnrichmentSettings, SearchSettings};
use crate::errors::{PlacesError, SearchFailureKind};
use crate::models::{Coordinates, Location, PlaceSummary, Review, SearchFilter};
use crate::services::provider::{
    build_request, dedupe_and_limit, fetch_json, http_client, rate_limiter, DirectRateLimiter,
    PlaceEnrichment, PlaceSearch,
};
use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Deserialize;
use std::time::Duration;

const GOOGLE_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Google Places API client
/// DOCUMENTATION: Handles authentication and API calls to Google Places
pub struct GooglePlacesClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Maps API key
    api_key: String,
    /// Base URL for Google Places API
    base_url: String,
    search: SearchSettings,
    enrichment: EnrichmentSettings,
    limiter: DirectRateLimiter,
}

/// Response from Google Places Nearby Search
/// DOCUMENTATION: Google reports most failures in `status` with HTTP 200
#[derive(Debug, Deserialize)]
pub struct GooglePlacesResponse {
    /// Results array from API
    #[serde(default)]
    pub results: Vec<GooglePlace>,
    /// Status of the API call
    pub status: String,
    /// Error message (if status is not OK)
    pub error_message: Option<String>,
}

/// Individual place from Google Places API
/// DOCUMENTATION: Wire shape; `normalize_place` applies fallbacks
#[derive(Debug, Clone, Deserialize)]
pub struct GooglePlace {
    /// Google's unique place identifier
    pub place_id: Option<String>,
    /// Place name
    pub name: Option<String>,
    /// Geographic location
    pub geometry: Option<GoogleGeometry>,
    /// Formatted address (detailed, from Place Details)
    pub formatted_address: Option<String>,
    /// Vicinity (short address, from Nearby Search)
    pub vicinity: Option<String>,
    /// Rating (0-5)
    pub rating: Option<f32>,
    /// Number of user ratings
    pub user_ratings_total: Option<u32>,
    /// Explicit accessibility attribute
    pub wheelchair_accessible_entrance: Option<bool>,
    /// Editorial summary (description)
    pub editorial_summary: Option<GoogleEditorialSummary>,
}

/// Geographic location from Google
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleGeometry {
    pub location: Option<GoogleLocation>,
}

/// Coordinates from Google
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleEditorialSummary {
    pub overview: Option<String>,
}

/// Place Details response restricted to the requested fields
#[derive(Debug, Deserialize)]
pub struct GoogleDetailsResponse {
    pub result: Option<GoogleDetails>,
    pub status: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleDetails {
    #[serde(default)]
    pub photos: Vec<GooglePhoto>,
    #[serde(default)]
    pub reviews: Vec<GoogleReview>,
}

/// Review from Google Places
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleReview {
    /// Review author name
    pub author_name: Option<String>,
    /// Review text
    pub text: Option<String>,
}

/// Photo from Google Places
#[derive(Debug, Clone, Deserialize)]
pub struct GooglePhoto {
    /// Photo reference (used to fetch actual photo); entries without one are skipped
    pub photo_reference: Option<String>,
}

impl GooglePlacesClient {
    /// Create new Google Places API client
    pub fn new(
        api_key: String,
        search: SearchSettings,
        enrichment: EnrichmentSettings,
        timeout: Duration,
        requests_per_second: u32,
    ) -> Result<Self, PlacesError> {
        Ok(Self {
            client: http_client(timeout, "sensory-places")?,
            api_key,
            base_url: GOOGLE_PLACES_BASE_URL.to_string(),
            search,
            enrichment,
            limiter: rate_limiter(requests_per_second),
        })
    }

    /// Build the nearby search request
    ///
    /// # Arguments
    /// * `location` - Resolved search center
    /// * `filter` - Radius in meters and optional Google place type
    pub fn nearby_search_request(
        &self,
        location: &Location,
        filter: &SearchFilter,
    ) -> Result<Request, PlacesError> {
        let mut params = vec![
            ("location", location.coordinates.to_query_value()),
            ("radius", filter.radius_m.to_string()),
            ("keyword", self.search.keyword_query()),
            ("key", self.api_key.clone()),
        ];

        if let Some(place_type) = &filter.category {
            params.push(("type", place_type.clone()));
        }

        build_request(
            self.client
                .get(format!("{}/nearbysearch/json", self.base_url))
                .query(&params),
            "Google Places nearby search",
        )
    }

    fn details_request(&self, place_id: &str, fields: &str) -> Result<Request, PlacesError> {
        build_request(
            self.client
                .get(format!("{}/details/json", self.base_url))
                .query(&[
                    ("place_id", place_id),
                    ("fields", fields),
                    ("key", self.api_key.as_str()),
                ]),
            "Google Places details",
        )
    }

    /// Map the in-body status to a result
    /// DOCUMENTATION: OK and ZERO_RESULTS are successes; the rest are failures
    pub fn check_status(status: &str, error_message: Option<String>) -> Result<(), PlacesError> {
        match status {
            "OK" | "ZERO_RESULTS" => Ok(()),
            "OVER_QUERY_LIMIT" => {
                log::error!("Google Places API quota exceeded");
                Err(PlacesError::SearchFailure(SearchFailureKind::RateLimited {
                    retry_after: None,
                }))
            }
            "REQUEST_DENIED" => {
                let msg = error_message.unwrap_or_else(|| "Unknown error".to_string());
                log::error!("Google Places API request denied: {}", msg);
                Err(PlacesError::SearchFailure(SearchFailureKind::Unauthorized))
            }
            other => {
                let msg = error_message.unwrap_or_else(|| format!("Unknown status: {}", other));
                log::error!("Google Places API unexpected status: {}", msg);
                Err(PlacesError::malformed(msg))
            }
        }
    }

    /// Convert a wire place to a summary
    /// DOCUMENTATION: Prefers formatted_address over vicinity; a missing
    /// place_id makes the response malformed
    pub fn normalize_place(raw: GooglePlace) -> Result<PlaceSummary, PlacesError> {
        let id = raw
            .place_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| PlacesError::malformed("Google place without place_id"))?;

        let coordinates = raw
            .geometry
            .and_then(|g| g.location)
            .map(|loc| Coordinates::new(loc.lat, loc.lng));

        let address = raw.formatted_address.or(raw.vicinity);

        let mut summary = PlaceSummary::new(id, raw.name, address, coordinates);
        summary.description = raw.editorial_summary.and_then(|s| s.overview);
        summary.wheelchair_accessible = raw.wheelchair_accessible_entrance;
        summary.rating = raw.rating;
        summary.rating_count = raw.user_ratings_total;
        Ok(summary)
    }

    /// Get photo URL from photo reference
    /// DOCUMENTATION: `<base>/photo?maxwidth=` + size token + `&photoreference=...&key=...`
    pub fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{}/photo?maxwidth={}&photoreference={}&key={}",
            self.base_url, self.enrichment.photo_size, photo_reference, self.api_key
        )
    }

    /// Photo URLs for the entries that carry a reference, up to the photo limit
    pub fn photo_urls(&self, photos: &[GooglePhoto]) -> Vec<String> {
        photos
            .iter()
            .filter_map(|photo| photo.photo_reference.as_deref())
            .filter(|reference| !reference.is_empty())
            .take(self.enrichment.photo_limit)
            .map(|reference| self.photo_url(reference))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn details(&self, place_id: &str, fields: &str) -> Result<GoogleDetails, PlacesError> {
        log::debug!("Google Places details lookup: place_id={}, fields={}", place_id, fields);

        let request = self.details_request(place_id, fields)?;
        let response: GoogleDetailsResponse =
            fetch_json(&self.client, &self.limiter, request, "Google Places details").await?;

        Self::check_status(&response.status, response.error_message)?;
        Ok(response.result.unwrap_or_default())
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    fn provider_name(&self) -> &'static str {
        "google"
    }

    async fn search(
        &self,
        location: &Location,
        filter: &SearchFilter,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        log::debug!(
            "Google Places nearby search: location={}, radius={}, type={:?}",
            location.coordinates.to_query_value(),
            filter.radius_m,
            filter.category
        );

        let request = self.nearby_search_request(location, filter)?;
        let response: GooglePlacesResponse = fetch_json(
            &self.client,
            &self.limiter,
            request,
            "Google Places nearby search",
        )
        .await?;

        Self::check_status(&response.status, response.error_message)?;

        let places = response
            .results
            .into_iter()
            .map(Self::normalize_place)
            .collect::<Result<Vec<_>, _>>()?;

        let places = dedupe_and_limit(places, self.search.result_limit);
        log::info!("Google Places search returned {} results", places.len());
        Ok(places)
    }
}

#[async_trait]
impl PlaceEnrichment for GooglePlacesClient {
    async fn photos_for(&self, place_id: &str) -> Result<Vec<String>, PlacesError> {
        let details = self.details(place_id, "photos").await?;
        Ok(self.photo_urls(&details.photos))
    }

    async fn reviews_for(&self, place_id: &str) -> Result<Vec<Review>, PlacesError> {
        let details = self.details(place_id, "reviews").await?;

        Ok(details
            .reviews
            .into_iter()
            .take(self.enrichment.review_limit)
            .map(|review| Review::new(review.author_name, review.text))
            .collect())
    }
}
