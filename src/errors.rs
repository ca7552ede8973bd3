// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the aggregation pipeline and its HTTP surface

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Distinguishes why a place search failed
/// DOCUMENTATION: Every kind is reported as retryable; Unauthorized additionally
/// points operators at the configured provider credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailureKind {
    /// Provider quota exhausted; carries Retry-After seconds when supplied
    RateLimited { retry_after: Option<u64> },
    /// Provider rejected the API key
    Unauthorized,
    /// Network error, timeout or unexpected HTTP status
    Transport(String),
    /// Response body missing required fields or not parseable
    Malformed(String),
}

impl fmt::Display for SearchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchFailureKind::RateLimited {
                retry_after: Some(secs),
            } => write!(f, "rate limited (retry after {}s)", secs),
            SearchFailureKind::RateLimited { retry_after: None } => write!(f, "rate limited"),
            SearchFailureKind::Unauthorized => write!(f, "provider rejected credentials"),
            SearchFailureKind::Transport(msg) => write!(f, "transport error: {}", msg),
            SearchFailureKind::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

/// Which enrichment sub-call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentPart {
    Photos,
    Reviews,
}

impl fmt::Display for EnrichmentPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentPart::Photos => write!(f, "photos"),
            EnrichmentPart::Reviews => write!(f, "reviews"),
        }
    }
}

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and error response.
/// Geocode and search failures are terminal for one request only; enrichment
/// failures never reach the HTTP layer because the pipeline swallows them.
#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Could not resolve location: {0}")]
    GeocodeFailure(String),

    #[error("Place search failed: {0}")]
    SearchFailure(SearchFailureKind),

    #[error("Fetching {part} for place {place_id} failed: {reason}")]
    EnrichmentFailure {
        place_id: String,
        part: EnrichmentPart,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Message relay failed: {0}")]
    RelayFailure(String),

    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),
}

impl PlacesError {
    /// Shorthand for a transport-level search failure
    pub fn transport(msg: impl Into<String>) -> Self {
        PlacesError::SearchFailure(SearchFailureKind::Transport(msg.into()))
    }

    /// Shorthand for a malformed provider response
    pub fn malformed(msg: impl Into<String>) -> Self {
        PlacesError::SearchFailure(SearchFailureKind::Malformed(msg.into()))
    }

    /// Whether the user can simply try the same action again
    pub fn is_retryable(&self) -> bool {
        match self {
            PlacesError::GeocodeFailure(_) => true,
            PlacesError::SearchFailure(_) => true,
            PlacesError::EnrichmentFailure { .. } => true,
            PlacesError::RelayFailure(_) | PlacesError::ServiceUnavailable(_) => true,
            PlacesError::InvalidInput(_)
            | PlacesError::ValidationError(_)
            | PlacesError::Configuration(_) => false,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PlacesError::GeocodeFailure(_) => "GEOCODE_FAILURE",
            PlacesError::SearchFailure(SearchFailureKind::RateLimited { .. }) => {
                "SEARCH_RATE_LIMITED"
            }
            PlacesError::SearchFailure(SearchFailureKind::Unauthorized) => "SEARCH_UNAUTHORIZED",
            PlacesError::SearchFailure(SearchFailureKind::Transport(_)) => "SEARCH_TRANSPORT",
            PlacesError::SearchFailure(SearchFailureKind::Malformed(_)) => "SEARCH_MALFORMED",
            PlacesError::EnrichmentFailure { .. } => "ENRICHMENT_FAILURE",
            PlacesError::InvalidInput(_) => "INVALID_INPUT",
            PlacesError::ValidationError(_) => "VALIDATION_ERROR",
            PlacesError::Configuration(_) => "CONFIGURATION_ERROR",
            PlacesError::RelayFailure(_) => "RELAY_FAILURE",
            PlacesError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Text safe to show HTTP callers
    /// DOCUMENTATION: Upstream transport and parse details stay in the logs
    fn client_message(&self) -> String {
        match self {
            PlacesError::SearchFailure(SearchFailureKind::Transport(_)) => {
                "Place search failed: the provider could not be reached".to_string()
            }
            PlacesError::SearchFailure(SearchFailureKind::Malformed(_)) => {
                "Place search failed: the provider returned an unexpected response".to_string()
            }
            PlacesError::RelayFailure(_) => "Message relay failed".to_string(),
            PlacesError::Configuration(_) => "Service is misconfigured".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Convert PlacesError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let message = self.client_message();
        if message != self.to_string() {
            log::error!("{} ({})", message, self);
        }

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": message,
                "retryable": self.is_retryable(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        let mut builder = HttpResponse::build(self.status_code());
        if let PlacesError::SearchFailure(SearchFailureKind::RateLimited {
            retry_after: Some(secs),
        }) = self
        {
            builder.insert_header(("Retry-After", secs.to_string()));
        }
        builder.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlacesError::GeocodeFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlacesError::SearchFailure(SearchFailureKind::RateLimited { .. }) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            PlacesError::SearchFailure(_) => StatusCode::BAD_GATEWAY,
            PlacesError::EnrichmentFailure { .. } => StatusCode::BAD_GATEWAY,
            PlacesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlacesError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PlacesError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlacesError::RelayFailure(_) => StatusCode::BAD_GATEWAY,
            PlacesError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PlacesError::GeocodeFailure("nowhere".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            PlacesError::SearchFailure(SearchFailureKind::RateLimited { retry_after: None })
                .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            PlacesError::SearchFailure(SearchFailureKind::Unauthorized).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            PlacesError::InvalidInput("radius".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let err = PlacesError::SearchFailure(SearchFailureKind::RateLimited {
            retry_after: Some(30),
        });
        let response = err.error_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok()),
            Some("30")
        );
    }

    #[test]
    fn test_retryable() {
        assert!(PlacesError::GeocodeFailure("x".to_string()).is_retryable());
        assert!(PlacesError::transport("timeout").is_retryable());
        assert!(PlacesError::SearchFailure(SearchFailureKind::Unauthorized).is_retryable());
        assert!(PlacesError::malformed("missing id").is_retryable());
        assert!(!PlacesError::ValidationError("email".to_string()).is_retryable());
    }

    async fn body_json(err: &PlacesError) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(err.error_response().into_body())
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn test_transport_detail_is_not_sent_to_clients() {
        let err = PlacesError::transport(
            "error sending request for url (https://maps.example/json?key=SECRET_KEY_123)",
        );

        let body = body_json(&err).await;

        assert_eq!(body["error"]["code"], "SEARCH_TRANSPORT");
        assert_eq!(body["error"]["retryable"], true);
        assert!(!body.to_string().contains("SECRET_KEY_123"));
    }

    #[actix_rt::test]
    async fn test_malformed_detail_is_not_sent_to_clients() {
        let err = PlacesError::malformed("Google Places: expected value at line 1 column 1");

        let body = body_json(&err).await;

        assert_eq!(body["error"]["code"], "SEARCH_MALFORMED");
        assert!(!body.to_string().contains("line 1 column 1"));
    }

    #[actix_rt::test]
    async fn test_client_facing_errors_keep_their_message() {
        let err = PlacesError::GeocodeFailure("Atlantis: no candidates".to_string());

        let body = body_json(&err).await;

        assert_eq!(
            body["error"]["message"],
            "Could not resolve location: Atlantis: no candidates"
        );
    }
}
