//! Error types for upstream requests.

use thiserror::Error;

/// Upstream-specific errors.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The configured endpoint could not be built.
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    /// Network error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The request did not complete in time.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Non-success HTTP status.
    #[error("Request failed with status {status}: {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, retry after {0} seconds")]
    RateLimitExceeded(u64),
}

/// Result type for upstream operations.
pub type Result<T> = std::result::Result<T, UpstreamError>;
