//! Feed error types.

use thiserror::Error;

/// Errors that can occur while producing a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The document could not be serialized.
    #[error("feed encoding failed: {0}")]
    Encode(#[from] atom_syndication::Error),
}

/// A specialized Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
