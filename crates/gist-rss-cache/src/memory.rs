//! In-memory LRU cache backend.
//!
//! Bounded by entry count, with an optional per-entry time-to-live. Expired
//! entries are dropped lazily on read, which the caller observes as a miss.

use crate::{CacheError, Result, SharedCache};
use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for the in-memory cache.
///
/// `max_value_bytes` bounds the stored listing, not the upstream read. A
/// listing larger than the limit is rejected by `set`, which the feed
/// handler reports as a failed cache write (HTTP 500). Raise it through
/// `cache.max_value_bytes` for users with very long gist listings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of keys held before least-recently-used eviction.
    pub max_entries: usize,
    /// Largest value accepted by `set`, in bytes.
    pub max_value_bytes: usize,
    /// Expiry applied to every entry (`None` = never expire).
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 64,
            max_value_bytes: 1024 * 1024, // 1 MB, the usual memcached item limit
            ttl: None,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of evictions (capacity or expiry).
    pub evictions: u64,
    /// Current number of cached keys.
    pub size: usize,
}

impl CacheStats {
    /// Returns the cache hit ratio.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache counters for monitoring.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheMetrics {
    /// Creates new cache metrics.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns current counters.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedItem {
    value: Bytes,
    stored_at: Instant,
}

/// In-process cache backend.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, CachedItem>>,
    config: CacheConfig,
    metrics: CacheMetrics,
}

impl MemoryCache {
    /// Creates a new cache.
    pub fn new(config: CacheConfig) -> Self {
        let max_entries = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(max_entries)),
            config,
            metrics: CacheMetrics::new(),
        }
    }

    /// Creates a cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let mut stats = self.metrics.snapshot();
        stats.size = entries.len();
        stats
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Drops a single key, as an external eviction would.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    fn is_expired(&self, item: &CachedItem) -> bool {
        match self.config.ttl {
            Some(ttl) => item.stored_at.elapsed() >= ttl,
            None => false,
        }
    }
}

#[async_trait]
impl SharedCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(item) if !self.is_expired(item) => {
                self.metrics.record_hit();
                return Ok(Some(item.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            self.metrics.record_eviction();
            tracing::debug!(key, "cache entry expired");
        }

        self.metrics.record_miss();
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        if value.len() > self.config.max_value_bytes {
            return Err(CacheError::Rejected {
                key: key.to_string(),
                reason: format!(
                    "{} bytes exceeds limit of {}",
                    value.len(),
                    self.config.max_value_bytes
                ),
            });
        }

        let item = CachedItem {
            value,
            stored_at: Instant::now(),
        };

        let mut entries = self.entries.lock();
        if let Some((evicted, _)) = entries.push(key.to_string(), item) {
            // `push` hands back the old value on overwrite; only a different key is an eviction.
            if evicted != key {
                self.metrics.record_eviction();
                tracing::debug!(key = %evicted, "cache entry evicted");
            }
        }

        Ok(())
    }
}
