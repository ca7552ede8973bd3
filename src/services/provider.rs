// src/services/provider.rs
// DOCUMENTATION: Seams between the pipeline and places providers
// PURPOSE: Search/enrichment traits plus the HTTP plumbing shared by provider clients

use crate::errors::{PlacesError, SearchFailureKind};
use crate::models::{Location, PlaceSummary, Review, SearchFilter};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Request, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::time::Duration;

/// Place search against one provider
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Provider name for logs and responses
    fn provider_name(&self) -> &'static str;

    /// Search around a resolved location
    ///
    /// # Returns
    /// At most the configured limit of places, unique by id, in provider order
    async fn search(
        &self,
        location: &Location,
        filter: &SearchFilter,
    ) -> Result<Vec<PlaceSummary>, PlacesError>;
}

/// Per-place media lookups
/// DOCUMENTATION: The two calls are independent; callers treat a failure of
/// either one as "nothing available" for that part only
#[async_trait]
pub trait PlaceEnrichment: Send + Sync {
    /// Display-ready photo URLs, newest first
    async fn photos_for(&self, place_id: &str) -> Result<Vec<String>, PlacesError>;

    /// Review or tip snippets, newest first
    async fn reviews_for(&self, place_id: &str) -> Result<Vec<Review>, PlacesError>;
}

/// Unkeyed token bucket shared by all calls of one client
pub type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Build a limiter allowing `per_second` outbound requests
pub fn rate_limiter(per_second: u32) -> DirectRateLimiter {
    let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
    RateLimiter::direct(quota)
}

/// HTTP client with the per-call timeout applied
pub fn http_client(timeout: Duration, user_agent: &str) -> Result<Client, PlacesError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| PlacesError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Seconds from a numeric Retry-After header
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Map a non-success HTTP status to a search failure kind
pub fn failure_for_status(status: StatusCode, headers: &HeaderMap, body: &str) -> PlacesError {
    let kind = match status {
        StatusCode::TOO_MANY_REQUESTS => SearchFailureKind::RateLimited {
            retry_after: retry_after_secs(headers),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SearchFailureKind::Unauthorized,
        _ => {
            let snippet: String = body.chars().take(200).collect();
            SearchFailureKind::Transport(format!("HTTP {}: {}", status, snippet))
        }
    };
    PlacesError::SearchFailure(kind)
}

/// Finish a request builder, mapping builder errors to Transport
pub fn build_request(builder: RequestBuilder, what: &str) -> Result<Request, PlacesError> {
    builder
        .build()
        .map_err(|e| PlacesError::transport(format!("Invalid {} request: {}", what, e)))
}

/// Send a request through the limiter and decode the JSON body
/// DOCUMENTATION: Transport errors (including timeouts) map to Transport,
/// non-success statuses through `failure_for_status`, undecodable bodies to Malformed.
/// Request URLs never reach error text because some providers take the API key as a query parameter.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    limiter: &DirectRateLimiter,
    request: Request,
    what: &str,
) -> Result<T, PlacesError> {
    limiter.until_ready().await;

    let response = client.execute(request).await.map_err(|e| {
        let e = e.without_url();
        log::error!("{} request failed: {}", what, e);
        PlacesError::transport(format!("{} request failed: {}", what, e))
    })?;

    let status = response.status();
    if !status.is_success() {
        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        log::error!("{} returned HTTP {}: {}", what, status, body);
        return Err(failure_for_status(status, &headers, &body));
    }

    let bytes = response.bytes().await.map_err(|e| {
        PlacesError::transport(format!(
            "{} body could not be read: {}",
            what,
            e.without_url()
        ))
    })?;

    decode_json(&bytes, what)
}

/// Decode a success body, mapping parse errors to Malformed
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T, PlacesError> {
    serde_json::from_slice(bytes).map_err(|e| {
        log::error!("Failed to parse {} response: {}", what, e);
        PlacesError::malformed(format!("{}: {}", what, e))
    })
}

/// Keep the first occurrence of every id, then cut to `limit`
pub fn dedupe_and_limit(places: Vec<PlaceSummary>, limit: usize) -> Vec<PlaceSummary> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|place| seen.insert(place.id.clone()))
        .take(limit)
        .collect()
}

/// Minimal HTTP responder for exercising the fetch path in tests
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer every connection with the same status line and body; returns the base URL
    pub async fn serve(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::Value;

    fn summary(id: &str) -> PlaceSummary {
        PlaceSummary::new(id.to_string(), Some(id.to_string()), None, None)
    }

    #[test]
    fn test_dedupe_and_limit_keeps_first_occurrence() {
        let places = vec![summary("a"), summary("b"), summary("a"), summary("c")];
        let ids: Vec<String> = dedupe_and_limit(places, 10)
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedupe_and_limit_caps_length() {
        let places = (0..15).map(|i| summary(&i.to_string())).collect();
        assert_eq!(dedupe_and_limit(places, 10).len(), 10);
    }

    #[test]
    fn test_rate_limit_status_carries_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));

        let err = failure_for_status(StatusCode::TOO_MANY_REQUESTS, &headers, "");
        assert!(matches!(
            err,
            PlacesError::SearchFailure(SearchFailureKind::RateLimited {
                retry_after: Some(12)
            })
        ));
    }

    #[test]
    fn test_auth_and_generic_statuses() {
        let headers = HeaderMap::new();

        assert!(matches!(
            failure_for_status(StatusCode::UNAUTHORIZED, &headers, ""),
            PlacesError::SearchFailure(SearchFailureKind::Unauthorized)
        ));
        assert!(matches!(
            failure_for_status(StatusCode::INTERNAL_SERVER_ERROR, &headers, "boom"),
            PlacesError::SearchFailure(SearchFailureKind::Transport(_))
        ));
    }

    #[test]
    fn test_undecodable_body_is_malformed() {
        let result: Result<Value, PlacesError> = decode_json(b"<html>oops</html>", "Foursquare");

        assert!(matches!(
            result,
            Err(PlacesError::SearchFailure(SearchFailureKind::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_json_maps_undecodable_success_body_to_malformed() {
        let base = test_server::serve("200 OK", "{\"results\": [").await;
        let client = http_client(Duration::from_secs(5), "sensory-places-test").unwrap();
        let request = build_request(client.get(format!("{}/search", base)), "Foursquare").unwrap();

        let result: Result<Value, PlacesError> =
            fetch_json(&client, &rate_limiter(10), request, "Foursquare").await;

        assert!(matches!(
            result,
            Err(PlacesError::SearchFailure(SearchFailureKind::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_json_maps_error_status_through_failure_kind() {
        let base = test_server::serve("401 Unauthorized", "{}").await;
        let client = http_client(Duration::from_secs(5), "sensory-places-test").unwrap();
        let request = build_request(client.get(format!("{}/search", base)), "Foursquare").unwrap();

        let result: Result<Value, PlacesError> =
            fetch_json(&client, &rate_limiter(10), request, "Foursquare").await;

        assert!(matches!(
            result,
            Err(PlacesError::SearchFailure(SearchFailureKind::Unauthorized))
        ));
    }

    #[tokio::test]
    async fn test_transport_error_omits_request_url() {
        let client = http_client(Duration::from_secs(5), "sensory-places-test").unwrap();
        let request = build_request(
            client
                .get("http://127.0.0.1:9/search")
                .query(&[("key", "SECRET_KEY_123")]),
            "Google Places",
        )
        .unwrap();

        let err = fetch_json::<Value>(&client, &rate_limiter(10), request, "Google Places")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PlacesError::SearchFailure(SearchFailureKind::Transport(_))
        ));
        assert!(!err.to_string().contains("SECRET_KEY_123"));
    }
}
