//! Cache error types.

use thiserror::Error;

/// Errors reported by a cache backend.
///
/// A missing key is not an error; see [`crate::SharedCache::get`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend failed to serve the request.
    #[error("cache backend error: {0}")]
    Backend(String),

    /// The value was rejected by the backend.
    #[error("value for key {key} rejected: {reason}")]
    Rejected {
        /// Key being written.
        key: String,
        /// Why the backend refused it.
        reason: String,
    },
}

/// A specialized Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
