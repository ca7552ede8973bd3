// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use crate::config::catalog::{
    AccessibilityStrategy, ClassifierSettings, EnrichmentSettings, GeocoderKind, Provider,
    SearchSettings, DEFAULT_ACCESSIBILITY_KEYWORDS, DEFAULT_CONTACT_DOMAINS,
    DEFAULT_SENSORY_KEYWORDS,
};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Hard ceiling on places per search; each place costs two enrichment calls
pub const MAX_RESULT_LIMIT: usize = 10;

/// env_logger filter used when LOG_LEVEL is unset or blank
pub const DEFAULT_LOG_LEVEL: &str = "info,actix_web=info";

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8080)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Places provider used for search and enrichment
    pub provider: Provider,

    /// Foursquare Places API key (sent as Authorization header)
    pub foursquare_api_key: String,

    /// Google Maps API key (places, photos and geocoding)
    pub google_maps_api_key: String,

    /// Geocoding backend
    pub geocoder: GeocoderKind,

    /// User-Agent sent to Nominatim (required by its usage policy)
    pub nominatim_user_agent: String,

    /// Maximum places per search (capped at 10)
    pub search_result_limit: usize,

    /// Radius used when the request gives none
    pub default_radius_m: u32,

    /// Keywords OR-combined into provider queries
    pub sensory_keywords: Vec<String>,

    /// Keywords that mark a place as accessible
    pub accessibility_keywords: Vec<String>,

    /// Accessibility decision strategy
    pub accessibility_strategy: AccessibilityStrategy,

    /// Photo size token, e.g. "300x300" for Foursquare or "400" for Google
    pub photo_size: String,

    /// Photos fetched per place
    pub photo_limit: usize,

    /// Reviews fetched per place
    pub review_limit: usize,

    /// Per-call timeout for outbound provider requests, in seconds
    pub provider_timeout_secs: u64,

    /// Outbound request budget per provider client
    pub provider_requests_per_second: u32,

    /// Places enriched concurrently
    pub enrichment_concurrency: usize,

    /// Geocode cache TTL in seconds (0 = keep for the process lifetime)
    pub geocode_cache_ttl_secs: u64,

    /// Endpoint that accepts contact messages for delivery
    pub contact_relay_url: Option<String>,

    /// Operator address receiving contact messages
    pub contact_operator_email: String,

    /// Domain suffixes accepted for contact sender addresses
    pub contact_allowed_domains: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenv().ok();

        let provider = env_parse("PLACES_PROVIDER", Provider::Foursquare);

        Config {
            server_address: env_or("SERVER_ADDRESS", "127.0.0.1"),

            server_port: env_parse("SERVER_PORT", 8080),

            environment: env_or("ENVIRONMENT", "development"),

            log_level: env_or("LOG_LEVEL", DEFAULT_LOG_LEVEL),

            provider,

            foursquare_api_key: env_or("FOURSQUARE_API_KEY", ""),

            google_maps_api_key: env_or("GOOGLE_MAPS_API_KEY", ""),

            geocoder: env_parse("GEOCODER", provider.default_geocoder()),

            nominatim_user_agent: env_or("NOMINATIM_USER_AGENT", "sensory-places"),

            search_result_limit: env_parse("SEARCH_RESULT_LIMIT", MAX_RESULT_LIMIT),

            default_radius_m: env_parse("DEFAULT_RADIUS_M", 1609),

            sensory_keywords: env_list("SENSORY_KEYWORDS", DEFAULT_SENSORY_KEYWORDS),

            accessibility_keywords: env_list(
                "ACCESSIBILITY_KEYWORDS",
                DEFAULT_ACCESSIBILITY_KEYWORDS,
            ),

            accessibility_strategy: env_parse(
                "ACCESSIBILITY_STRATEGY",
                AccessibilityStrategy::PreferProviderFlag,
            ),

            photo_size: env_or("PHOTO_SIZE", provider.default_photo_size()),

            photo_limit: env_parse("PHOTO_LIMIT", 1),

            review_limit: env_parse("REVIEW_LIMIT", 5),

            provider_timeout_secs: env_parse("PROVIDER_TIMEOUT_SECS", 8),

            provider_requests_per_second: env_parse("PROVIDER_REQUESTS_PER_SECOND", 10),

            enrichment_concurrency: env_parse("ENRICHMENT_CONCURRENCY", 4),

            geocode_cache_ttl_secs: env_parse("GEOCODE_CACHE_TTL_SECS", 0),

            contact_relay_url: env::var("CONTACT_RELAY_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),

            contact_operator_email: env_or("CONTACT_OPERATOR_EMAIL", ""),

            contact_allowed_domains: env_list("CONTACT_ALLOWED_DOMAINS", DEFAULT_CONTACT_DOMAINS),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        match self.provider {
            Provider::Foursquare if self.foursquare_api_key.is_empty() => {
                return Err("FOURSQUARE_API_KEY is required for the foursquare provider".to_string());
            }
            Provider::Google if self.google_maps_api_key.is_empty() => {
                return Err("GOOGLE_MAPS_API_KEY is required for the google provider".to_string());
            }
            _ => {}
        }

        if self.geocoder == GeocoderKind::Google && self.google_maps_api_key.is_empty() {
            return Err("GOOGLE_MAPS_API_KEY is required for the google geocoder".to_string());
        }

        if self.search_result_limit == 0 {
            return Err("SEARCH_RESULT_LIMIT must be at least 1".to_string());
        }

        if self.sensory_keywords.is_empty() {
            return Err("SENSORY_KEYWORDS must not be empty".to_string());
        }

        if self.enrichment_concurrency == 0 || self.provider_requests_per_second == 0 {
            return Err(
                "ENRICHMENT_CONCURRENCY and PROVIDER_REQUESTS_PER_SECOND must be positive"
                    .to_string(),
            );
        }

        if self.search_result_limit > MAX_RESULT_LIMIT {
            log::warn!(
                "SEARCH_RESULT_LIMIT={} exceeds {}, capping",
                self.search_result_limit,
                MAX_RESULT_LIMIT
            );
        }

        if self.contact_relay_url.is_none() || self.contact_operator_email.is_empty() {
            log::warn!("CONTACT_RELAY_URL/CONTACT_OPERATOR_EMAIL not configured - contact form disabled");
        }

        Ok(())
    }

    /// Outbound request timeout
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs.max(1))
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            sensory_keywords: self.sensory_keywords.clone(),
            result_limit: self.search_result_limit.clamp(1, MAX_RESULT_LIMIT),
        }
    }

    pub fn enrichment_settings(&self) -> EnrichmentSettings {
        EnrichmentSettings {
            photo_size: self.photo_size.clone(),
            photo_limit: self.photo_limit,
            review_limit: self.review_limit,
        }
    }

    pub fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            accessibility_keywords: self.accessibility_keywords.clone(),
            sensory_keywords: self.sensory_keywords.clone(),
            strategy: self.accessibility_strategy,
        }
    }

    /// Geocode cache TTL, `None` when entries never expire
    pub fn geocode_cache_ttl(&self) -> Option<Duration> {
        (self.geocode_cache_ttl_secs > 0).then(|| Duration::from_secs(self.geocode_cache_ttl_secs))
    }
}

/// Variable value, or the default when unset or blank
fn env_or(key: &str, default: &str) -> String {
    non_blank_or(env::var(key).ok(), default)
}

fn non_blank_or(raw: Option<String>, default: &str) -> String {
    raw.filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse a variable, falling back to the default when unset or unparseable
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparseable {}={}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

/// Comma separated list; blank entries are dropped
fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(raw) => split_list(&raw),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_address: "127.0.0.1".to_string(),
            server_port: 8080,
            environment: "test".to_string(),
            log_level: "info".to_string(),
            provider: Provider::Foursquare,
            foursquare_api_key: "fsq-key".to_string(),
            google_maps_api_key: String::new(),
            geocoder: GeocoderKind::Nominatim,
            nominatim_user_agent: "sensory-places-test".to_string(),
            search_result_limit: 10,
            default_radius_m: 1609,
            sensory_keywords: vec!["quiet".to_string()],
            accessibility_keywords: vec!["wheelchair".to_string()],
            accessibility_strategy: AccessibilityStrategy::Keywords,
            photo_size: "300x300".to_string(),
            photo_limit: 1,
            review_limit: 5,
            provider_timeout_secs: 8,
            provider_requests_per_second: 10,
            enrichment_concurrency: 4,
            geocode_cache_ttl_secs: 0,
            contact_relay_url: None,
            contact_operator_email: String::new(),
            contact_allowed_domains: vec![".com".to_string()],
        }
    }

    #[test]
    fn test_validate_requires_provider_key() {
        let mut config = base_config();
        assert!(config.validate().is_ok());

        config.provider = Provider::Google;
        config.geocoder = GeocoderKind::Google;
        assert!(config.validate().is_err());

        config.google_maps_api_key = "g-key".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_settings_caps_limit() {
        let mut config = base_config();
        config.search_result_limit = 50;

        assert_eq!(config.search_settings().result_limit, MAX_RESULT_LIMIT);
    }

    #[test]
    fn test_geocode_cache_ttl_zero_means_forever() {
        let mut config = base_config();
        assert_eq!(config.geocode_cache_ttl(), None);

        config.geocode_cache_ttl_secs = 60;
        assert_eq!(config.geocode_cache_ttl(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_split_list_trims_and_drops_blanks() {
        assert_eq!(
            split_list(" quiet, low lighting ,,cozy "),
            vec!["quiet", "low lighting", "cozy"]
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        assert_eq!(non_blank_or(None, DEFAULT_LOG_LEVEL), "info,actix_web=info");
        assert_eq!(
            non_blank_or(Some("  ".to_string()), DEFAULT_LOG_LEVEL),
            DEFAULT_LOG_LEVEL
        );
        assert_eq!(non_blank_or(Some("debug".to_string()), DEFAULT_LOG_LEVEL), "debug");
    }
}
