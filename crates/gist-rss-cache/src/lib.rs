//! # gist-rss Cache
//!
//! The shared key-value cache used to memoize the upstream gist listing and
//! the time it was fetched.
//!
//! The cache is treated as an external service: every backend provides
//! atomic per-key `get`/`set`, and a missing key is reported as `Ok(None)`
//! rather than an error. Backends may evict entries on their own schedule.
//!
//! ## Backends
//!
//! - [`MemoryCache`] - in-process LRU with optional TTL expiry
//!
//! ## Example
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use gist_rss_cache::{CacheConfig, MemoryCache, SharedCache};
//!
//! # async fn run() -> gist_rss_cache::Result<()> {
//! let cache = MemoryCache::new(CacheConfig::default());
//! cache.set("last_update", Bytes::from_static(b"1700000000")).await?;
//! assert!(cache.get("last_update").await?.is_some());
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod traits;

pub use error::{CacheError, Result};
pub use memory::{CacheConfig, CacheMetrics, CacheStats, MemoryCache};
pub use traits::SharedCache;
