// src/services/cache.rs
// DOCUMENTATION: In-memory geocode cache
// PURPOSE: Avoid repeated geocoder calls for the same location text

use crate::models::Location;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache entry with optional expiration
#[derive(Clone, Debug)]
struct CacheEntry {
    location: Location,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(location: Location, ttl: Option<Duration>) -> Self {
        Self {
            location,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() > at)
            .unwrap_or(false)
    }
}

/// Thread-safe geocode cache keyed by the location text as typed
/// DOCUMENTATION: Entries live for the process lifetime unless a TTL is set.
/// Only successful lookups are stored.
pub struct GeocodeCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Option<Duration>,
}

impl GeocodeCache {
    /// Create new cache; `None` means entries never expire
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Exact input minus surrounding whitespace
    fn normalize_key(text: &str) -> String {
        text.trim().to_string()
    }

    /// Get cached location
    pub async fn get(&self, text: &str) -> Option<Location> {
        let key = Self::normalize_key(text);
        let store = self.store.read().await;

        match store.get(&key) {
            Some(entry) if !entry.is_expired() => {
                log::debug!("Geocode cache HIT for key: {}", key);
                Some(entry.location.clone())
            }
            Some(_) => {
                log::debug!("Geocode cache EXPIRED for key: {}", key);
                None
            }
            None => {
                log::debug!("Geocode cache MISS for key: {}", key);
                None
            }
        }
    }

    /// Store a resolved location
    pub async fn set(&self, text: &str, location: Location) {
        let key = Self::normalize_key(text);
        let mut store = self.store.write().await;
        store.insert(key.clone(), CacheEntry::new(location, self.ttl));
        log::debug!("Geocode cache SET for key: {}", key);
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Geocode cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries; only useful with a TTL
pub fn start_cleanup_task(cache: Arc<GeocodeCache>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            cache.cleanup().await;
        }
    });
}
