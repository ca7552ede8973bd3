// src/services/pipeline.rs
// DOCUMENTATION: Place aggregation pipeline
// PURPOSE: geocode -> search -> bounded enrichment fan-out -> classify -> assemble

use crate::config::{Config, Provider};
use crate::errors::{EnrichmentPart, PlacesError};
use crate::models::{Location, PlaceMedia, PlaceSummary, PlaceView, SearchFilter};
use crate::services::assembler::PresentationAssembler;
use crate::services::cache::GeocodeCache;
use crate::services::classifier::AccessibilityClassifier;
use crate::services::foursquare_client::FoursquareClient;
use crate::services::geocoder::{CachedGeocoder, Geocoder};
use crate::services::google_places_client::GooglePlacesClient;
use crate::services::provider::{PlaceEnrichment, PlaceSearch};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub location: Location,
    /// Views in search order
    pub views: Vec<PlaceView>,
}

/// Orchestrates one search end to end
/// DOCUMENTATION: Holds no per-search state; concurrent runs share only the
/// geocode cache behind the geocoder and the per-client rate limiters
pub struct SearchPipeline {
    geocoder: Arc<dyn Geocoder>,
    search: Arc<dyn PlaceSearch>,
    enrichment: Arc<dyn PlaceEnrichment>,
    classifier: AccessibilityClassifier,
    /// Places enriched at the same time
    concurrency: usize,
    /// Bound around each enrichment sub-call
    call_timeout: Duration,
}

impl SearchPipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        search: Arc<dyn PlaceSearch>,
        enrichment: Arc<dyn PlaceEnrichment>,
        classifier: AccessibilityClassifier,
        concurrency: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            search,
            enrichment,
            classifier,
            concurrency: concurrency.max(1),
            call_timeout,
        }
    }

    /// Wire the configured provider, geocoder and classifier
    pub fn from_config(config: &Config, cache: Arc<GeocodeCache>) -> Result<Self, PlacesError> {
        let geocoder = Arc::new(CachedGeocoder::from_config(config, cache)?);

        let (search, enrichment): (Arc<dyn PlaceSearch>, Arc<dyn PlaceEnrichment>) =
            match config.provider {
                Provider::Foursquare => {
                    let client = Arc::new(FoursquareClient::new(
                        config.foursquare_api_key.clone(),
                        config.search_settings(),
                        config.enrichment_settings(),
                        config.provider_timeout(),
                        config.provider_requests_per_second,
                    )?);
                    (client.clone(), client)
                }
                Provider::Google => {
                    let client = Arc::new(GooglePlacesClient::new(
                        config.google_maps_api_key.clone(),
                        config.search_settings(),
                        config.enrichment_settings(),
                        config.provider_timeout(),
                        config.provider_requests_per_second,
                    )?);
                    (client.clone(), client)
                }
            };

        log::info!(
            "Search pipeline ready: provider={}, geocoder={:?}, concurrency={}",
            search.provider_name(),
            config.geocoder,
            config.enrichment_concurrency
        );

        Ok(Self::new(
            geocoder,
            search,
            enrichment,
            AccessibilityClassifier::new(config.classifier_settings()),
            config.enrichment_concurrency,
            config.provider_timeout(),
        ))
    }

    /// Run one search
    ///
    /// # Errors
    /// * `GeocodeFailure` - location could not be resolved; nothing else is called
    /// * `SearchFailure` - provider search failed; no enrichment happens
    ///
    /// Enrichment failures never surface here; the affected place keeps
    /// empty photos or reviews.
    pub async fn run(
        &self,
        location_text: &str,
        filter: &SearchFilter,
    ) -> Result<PipelineOutcome, PlacesError> {
        let location = self.geocoder.geocode(location_text).await?;

        let summaries = self.search.search(&location, filter).await?;
        log::info!(
            "{} search near '{}' returned {} places",
            self.search.provider_name(),
            location.display_address,
            summaries.len()
        );

        let media = self.enrich_all(&summaries).await;

        let verdicts = summaries
            .iter()
            .map(|summary| {
                let reviews = media
                    .get(&summary.id)
                    .map(|m| m.reviews.as_slice())
                    .unwrap_or(&[]);
                (summary.id.clone(), self.classifier.classify(summary, reviews))
            })
            .collect::<HashMap<_, _>>();

        let views = PresentationAssembler::assemble(summaries, &media, &verdicts);

        Ok(PipelineOutcome { location, views })
    }

    /// Bounded fan-out keyed by place id
    async fn enrich_all(&self, summaries: &[PlaceSummary]) -> HashMap<String, PlaceMedia> {
        stream::iter(summaries.iter().map(|summary| summary.id.clone()))
            .map(|place_id| self.enrich_one(place_id))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Photos and reviews for one place, fetched together
    async fn enrich_one(&self, place_id: String) -> (String, PlaceMedia) {
        let (photos, reviews) = tokio::join!(
            self.guarded(
                &place_id,
                EnrichmentPart::Photos,
                self.enrichment.photos_for(&place_id)
            ),
            self.guarded(
                &place_id,
                EnrichmentPart::Reviews,
                self.enrichment.reviews_for(&place_id)
            ),
        );

        (place_id, PlaceMedia { photos, reviews })
    }

    /// Apply the call timeout and swallow failures into an empty sequence
    async fn guarded<T, F>(&self, place_id: &str, part: EnrichmentPart, call: F) -> Vec<T>
    where
        F: Future<Output = Result<Vec<T>, PlacesError>>,
    {
        let reason = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(items)) => return items,
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.call_timeout.as_millis()),
        };

        let failure = PlacesError::EnrichmentFailure {
            place_id: place_id.to_string(),
            part,
            reason,
        };
        log::warn!("{}", failure);
        Vec::new()
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::config::{CategoryCatalog, Provider};
    use crate::errors::SearchFailureKind;
    use std::sync::atomic::Ordering;
    use tokio_test::{assert_err, assert_ok};

    fn filter(category: Option<&str>) -> SearchFilter {
        SearchFilter {
            radius_m: 1609,
            category: category.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_boston_restaurant_search() {
        let catalog = CategoryCatalog::for_provider(Provider::Foursquare);
        let category = catalog.resolve("Restaurant").map(str::to_string);

        let mut places: Vec<PlaceSummary> = (0..12)
            .map(|i| summary(&format!("fsq-{}", i), Some("Harbor Table")))
            .collect();
        places[3] = summary("fsq-3", None);

        let search = Arc::new(FakeSearch::with_places(places));
        let pipeline = pipeline(
            Arc::new(FakeGeocoder::boston()),
            search.clone(),
            Arc::new(FakeEnrichment::default()),
            Duration::from_secs(1),
        );

        let outcome = assert_ok!(pipeline.run("Boston, MA", &filter(category.as_deref())).await);

        assert!(outcome.views.len() <= 10);
        assert!(outcome.views.iter().all(|v| !v.name.is_empty()));
        assert_eq!(outcome.views[3].name, "Unknown Place");
        assert_eq!(
            search.filters.lock().unwrap()[0].category.as_deref(),
            Some("4d4b7105d754a06374d81259")
        );
        assert!(outcome.views[0].accessible);
        assert_eq!(outcome.views[0].sensory_matches, vec!["quiet"]);
    }

    #[tokio::test]
    async fn test_geocode_failure_stops_pipeline() {
        let search = Arc::new(FakeSearch::with_places(vec![summary("a", Some("Cafe"))]));
        let enrichment = Arc::new(FakeEnrichment::default());
        let pipeline = pipeline(
            Arc::new(FakeGeocoder::boston()),
            search.clone(),
            enrichment.clone(),
            Duration::from_secs(1),
        );

        let err = assert_err!(pipeline.run("Qwxzzy Nowhere", &filter(None)).await);

        assert!(matches!(err, PlacesError::GeocodeFailure(_)));
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert_eq!(enrichment.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_failure_skips_enrichment() {
        let mut fake = FakeSearch::with_places(Vec::new());
        fake.failure = Some(SearchFailureKind::RateLimited {
            retry_after: Some(30),
        });
        let enrichment = Arc::new(FakeEnrichment::default());
        let pipeline = pipeline(
            Arc::new(FakeGeocoder::boston()),
            Arc::new(fake),
            enrichment.clone(),
            Duration::from_secs(1),
        );

        let err = assert_err!(pipeline.run("Boston, MA", &filter(None)).await);

        assert!(err.is_retryable());
        assert_eq!(enrichment.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slow_enrichment_degrades_to_empty_media() {
        let places = vec![
            summary("p1", Some("One")),
            summary("p2", Some("Two")),
            summary("p3", Some("Three")),
        ];
        let mut enrichment = FakeEnrichment::default();
        enrichment
            .slow
            .insert("p2".to_string(), Duration::from_millis(500));

        let pipeline = pipeline(
            Arc::new(FakeGeocoder::boston()),
            Arc::new(FakeSearch::with_places(places)),
            Arc::new(enrichment),
            Duration::from_millis(100),
        );

        let outcome = assert_ok!(pipeline.run("Boston, MA", &filter(None)).await);
        let ids: Vec<&str> = outcome.views.iter().map(|v| v.id.as_str()).collect();

        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert_eq!(outcome.views[0].photos.len(), 1);
        assert_eq!(outcome.views[0].reviews.len(), 1);
        assert!(outcome.views[1].photos.is_empty());
        assert!(outcome.views[1].reviews.is_empty());
        assert_eq!(outcome.views[2].photos.len(), 1);
        assert_eq!(outcome.views[2].reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_enrichment_failures_are_isolated() {
        let places = vec![summary("a", Some("Alpha")), summary("b", Some("Beta"))];
        let mut enrichment = FakeEnrichment::default();
        enrichment.failing_photos.insert("a".to_string());

        let pipeline = pipeline(
            Arc::new(FakeGeocoder::boston()),
            Arc::new(FakeSearch::with_places(places)),
            Arc::new(enrichment),
            Duration::from_secs(1),
        );

        let outcome = assert_ok!(pipeline.run("Boston, MA", &filter(None)).await);

        assert!(outcome.views[0].photos.is_empty());
        assert!(outcome.views[0].photo_url.is_none());
        assert_eq!(outcome.views[0].reviews.len(), 1);
        assert_eq!(outcome.views[1].photos.len(), 1);
        assert_eq!(outcome.views[1].reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_searches_are_idempotent() {
        let places = vec![summary("a", Some("Alpha")), summary("b", None)];
        let pipeline = pipeline(
            Arc::new(FakeGeocoder::boston()),
            Arc::new(FakeSearch::with_places(places)),
            Arc::new(FakeEnrichment::default()),
            Duration::from_secs(1),
        );

        let first = assert_ok!(pipeline.run("Boston, MA", &filter(None)).await);
        let second = assert_ok!(pipeline.run("Boston, MA", &filter(None)).await);

        assert_eq!(first.views, second.views);
        assert_eq!(first.location, second.location);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_collapsed() {
        let places = vec![
            summary("a", Some("Alpha")),
            summary("a", Some("Alpha again")),
            summary("b", Some("Beta")),
        ];
        let pipeline = pipeline(
            Arc::new(FakeGeocoder::boston()),
            Arc::new(FakeSearch::with_places(places)),
            Arc::new(FakeEnrichment::default()),
            Duration::from_secs(1),
        );

        let outcome = assert_ok!(pipeline.run("Boston, MA", &filter(None)).await);

        assert_eq!(outcome.views.len(), 2);
        assert_eq!(outcome.views[0].name, "Alpha");
    }

    #[tokio::test]
    async fn test_google_details_not_found_leaves_media_empty() {
        use crate::config::{EnrichmentSettings, SearchSettings};
        use crate::services::provider::test_server;

        let base = test_server::serve("200 OK", r#"{"status": "NOT_FOUND"}"#).await;
        let google = GooglePlacesClient::new(
            "test_key".to_string(),
            SearchSettings {
                sensory_keywords: vec!["quiet".to_string()],
                result_limit: 10,
            },
            EnrichmentSettings {
                photo_size: "400".to_string(),
                photo_limit: 1,
                review_limit: 5,
            },
            Duration::from_secs(5),
            10,
        )
        .unwrap()
        .with_base_url(base);
        let pipeline = SearchPipeline::new(
            Arc::new(FakeGeocoder::boston()),
            Arc::new(FakeSearch::with_places(vec![summary("ChIJgone", Some("Closed Cafe"))])),
            Arc::new(google),
            classifier(),
            4,
            Duration::from_secs(5),
        );

        let outcome = assert_ok!(pipeline.run("Boston, MA", &filter(None)).await);

        assert_eq!(outcome.views.len(), 1);
        assert!(outcome.views[0].photos.is_empty());
        assert!(outcome.views[0].reviews.is_empty());
        assert!(outcome.views[0].photo_url.is_none());
    }
}
