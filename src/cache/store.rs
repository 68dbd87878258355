//! TTL cache backed by a concurrent map
//!
//! Provides a `LocalCache` that stores any serializable value as JSON alongside
//! its expiry timestamp, and decodes it into the shape the caller asks for.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by cache reads and writes
#[derive(Debug, Error)]
pub enum CacheError {
    /// No live entry exists for the key
    #[error("No cache entry for key: {0}")]
    Missing(String),

    /// The stored payload does not match the requested shape
    #[error("Cache entry {key} could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be serialized for storage
    #[error("Value for {key} could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A stored payload and its lifetime
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe key/value store with per-entry expiry and hit/miss counters
///
/// Lookups are counted by [`LocalCache::has`]: a live entry is a hit, anything
/// else is a miss. Entries are only visible while the current time is before
/// their expiry.
#[derive(Debug)]
pub struct LocalCache {
    entries: DashMap<String, CacheEntry>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }
}

impl LocalCache {
    /// Creates an empty cache whose `put` uses `default_ttl`
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Drops the entry for `key` if it has expired
    fn evict_if_expired(&self, key: &str) {
        let now = Utc::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
    }

    /// Returns true iff a live entry exists, counting the lookup
    pub fn has(&self, key: &str) -> bool {
        self.evict_if_expired(key);
        let present = self.entries.contains_key(key);

        if present {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        present
    }

    /// Decodes the live entry for `key` into `T`
    ///
    /// # Returns
    /// * `Err(CacheError::Missing)` if there is no entry or it has expired
    /// * `Err(CacheError::Decode)` if the payload is not a `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.evict_if_expired(key);

        // Clone out of the shard before decoding so the lock is not held
        let value = self
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| CacheError::Missing(key.to_string()))?;

        serde_json::from_value(value).map_err(|source| CacheError::Decode {
            key: key.to_string(),
            source,
        })
    }

    /// Stores `value` with the default TTL
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.put_with_ttl(key, value, self.default_ttl)
    }

    /// Stores `value`, replacing any previous entry, visible for `ttl`
    pub fn put_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let value = serde_json::to_value(value).map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })?;

        let now = Utc::now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at,
            },
        );
        Ok(())
    }

    /// Removes every entry; the hit/miss counters keep running
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Hits over total lookups, in `0.0..=1.0`; zero before any lookup
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits + self.misses.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
