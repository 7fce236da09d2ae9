//! Cache backend trait.
//!
//! Defines the interface that all cache backends must implement.

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// A shared key-value cache with atomic per-key operations.
///
/// Implementations must be safe to call from concurrent requests; no
/// coordination beyond per-key consistency is expected.
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Reads a key. Returns `Ok(None)` on a cache miss.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Writes a key, replacing any previous value.
    async fn set(&self, key: &str, value: Bytes) -> Result<()>;
}

#[async_trait]
impl<T: SharedCache + ?Sized> SharedCache for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        (**self).set(key, value).await
    }
}
