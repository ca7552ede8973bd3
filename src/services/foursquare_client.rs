// src/services/foursquare_client.rs
// DOCUMENTATION: Foursquare Places API (v3) client
// PURPOSE: Sensory keyword search plus photo and tip lookups per place

use crate::config::{EnrichmentSettings, SearchSettings};
use crate::errors::PlacesError;
use crate::models::{Coordinates, Location, PlaceSummary, Review, SearchFilter};
use crate::services::provider::{
    build_request, dedupe_and_limit, fetch_json, http_client, rate_limiter, DirectRateLimiter,
    PlaceEnrichment, PlaceSearch,
};
use async_trait::async_trait;
use reqwest::{Client, Request, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

const FOURSQUARE_BASE_URL: &str = "https://api.foursquare.com/v3/places";

/// Foursquare Places API client
/// DOCUMENTATION: Authenticates with the raw API key in the Authorization header
pub struct FoursquareClient {
    /// HTTP client for making requests
    client: Client,
    /// Foursquare API key
    api_key: String,
    /// Base URL for the Places API
    base_url: String,
    search: SearchSettings,
    enrichment: EnrichmentSettings,
    limiter: DirectRateLimiter,
}

/// Response from places/search
#[derive(Debug, Deserialize)]
pub struct FoursquareSearchResponse {
    #[serde(default)]
    pub results: Vec<FoursquarePlace>,
}

/// Individual place from the search endpoint
/// DOCUMENTATION: Every field is optional on the wire; `normalize_place`
/// decides which ones are required
#[derive(Debug, Clone, Deserialize)]
pub struct FoursquarePlace {
    pub fsq_id: Option<String>,
    pub name: Option<String>,
    pub location: Option<FoursquareLocation>,
    pub geocodes: Option<FoursquareGeocodes>,
    pub description: Option<String>,
    /// Rating on Foursquare's 0-10 scale
    pub rating: Option<f32>,
    pub stats: Option<FoursquareStats>,
    pub wheelchair_access: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoursquareLocation {
    pub address: Option<String>,
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoursquareGeocodes {
    pub main: Option<FoursquarePoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoursquarePoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoursquareStats {
    pub total_ratings: Option<u32>,
}

/// Photo entry from places/{id}/photos
#[derive(Debug, Clone, Deserialize)]
pub struct FoursquarePhoto {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// Tip entry from places/{id}/tips
#[derive(Debug, Clone, Deserialize)]
pub struct FoursquareTip {
    pub text: Option<String>,
    pub user: Option<FoursquareUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoursquareUser {
    #[serde(rename = "firstName", alias = "first_name")]
    pub first_name: Option<String>,
}

impl FoursquareClient {
    /// Create new Foursquare client
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
            base_url: FOURSQUARE_BASE_URL.to_string(),
            search,
            enrichment,
            limiter: rate_limiter(requests_per_second),
        })
    }

    /// Build the places/search request
    /// DOCUMENTATION: The keyword expression is passed raw to `query()`,
    /// which percent-encodes it exactly once
    pub fn search_request(
        &self,
        location: &Location,
        filter: &SearchFilter,
    ) -> Result<Request, PlacesError> {
        let mut params = vec![
            ("ll", location.coordinates.to_query_value()),
            ("radius", filter.radius_m.to_string()),
            ("limit", self.search.result_limit.to_string()),
            ("query", self.search.keyword_query()),
        ];

        if let Some(category) = &filter.category {
            params.push(("categories", category.clone()));
        }

        build_request(
            self.authorized(format!("{}/search", self.base_url)).query(&params),
            "Foursquare search",
        )
    }

    fn authorized(&self, url: String) -> RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", &self.api_key)
            .header("Accept", "application/json")
    }

    /// Turn a raw place into a summary
    /// DOCUMENTATION: A missing fsq_id makes the whole response malformed;
    /// everything else has a fallback
    pub fn normalize_place(raw: FoursquarePlace) -> Result<PlaceSummary, PlacesError> {
        let id = raw
            .fsq_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| PlacesError::malformed("Foursquare place without fsq_id"))?;

        let address = raw
            .location
            .and_then(|loc| loc.address.or(loc.formatted_address));

        let coordinates = raw
            .geocodes
            .and_then(|g| g.main)
            .and_then(|point| match (point.latitude, point.longitude) {
                (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
                _ => None,
            });

        let mut summary = PlaceSummary::new(id, raw.name, address, coordinates);
        summary.description = raw.description;
        summary.wheelchair_accessible = raw.wheelchair_access;
        summary.rating = raw.rating;
        summary.rating_count = raw.stats.and_then(|s| s.total_ratings);
        Ok(summary)
    }

    /// prefix + size token + suffix
    pub fn photo_url(&self, photo: &FoursquarePhoto) -> Option<String> {
        match (&photo.prefix, &photo.suffix) {
            (Some(prefix), Some(suffix)) => Some(format!(
                "{}{}{}",
                prefix, self.enrichment.photo_size, suffix
            )),
            _ => None,
        }
    }

    fn tip_to_review(tip: FoursquareTip) -> Review {
        Review::new(tip.user.and_then(|u| u.first_name), tip.text)
    }
}

#[async_trait]
impl PlaceSearch for FoursquareClient {
    fn provider_name(&self) -> &'static str {
        "foursquare"
    }

    async fn search(
        &self,
        location: &Location,
        filter: &SearchFilter,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        log::debug!(
            "Foursquare search: ll={}, radius={}, category={:?}",
            location.coordinates.to_query_value(),
            filter.radius_m,
            filter.category
        );

        let request = self.search_request(location, filter)?;
        let response: FoursquareSearchResponse =
            fetch_json(&self.client, &self.limiter, request, "Foursquare search").await?;

        let places = response
            .results
            .into_iter()
            .map(Self::normalize_place)
            .collect::<Result<Vec<_>, _>>()?;

        let places = dedupe_and_limit(places, self.search.result_limit);
        log::info!("Foursquare search returned {} places", places.len());
        Ok(places)
    }
}

#[async_trait]
impl PlaceEnrichment for FoursquareClient {
    async fn photos_for(&self, place_id: &str) -> Result<Vec<String>, PlacesError> {
        let limit = self.enrichment.photo_limit.to_string();
        let request = build_request(
            self.authorized(format!("{}/{}/photos", self.base_url, place_id)).query(&[
                ("limit", limit.as_str()),
                ("sort", "NEWEST"),
                ("classifications", "indoor"),
            ]),
            "Foursquare photos",
        )?;

        let photos: Vec<FoursquarePhoto> =
            fetch_json(&self.client, &self.limiter, request, "Foursquare photos").await?;

        Ok(photos.iter().filter_map(|p| self.photo_url(p)).collect())
    }

    async fn reviews_for(&self, place_id: &str) -> Result<Vec<Review>, PlacesError> {
        let limit = self.enrichment.review_limit.to_string();
        let request = build_request(
            self.authorized(format!("{}/{}/tips", self.base_url, place_id))
                .query(&[("limit", limit.as_str()), ("sort", "NEWEST")]),
            "Foursquare tips",
        )?;

        let tips: Vec<FoursquareTip> =
            fetch_json(&self.client, &self.limiter, request, "Foursquare tips").await?;

        Ok(tips.into_iter().map(Self::tip_to_review).collect())
    }
}
