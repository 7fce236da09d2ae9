//! # gist-rss Upstream
//!
//! Fetches a user's public gist listing from the GitHub REST API.
//!
//! The listing is returned as raw bytes so that callers can cache it
//! verbatim; decoding happens later, when the feed is rendered.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gist_rss_upstream::{GistSource, GitHubConfig, GitHubGistSource};
//!
//! let source = GitHubGistSource::new(GitHubConfig::for_user("octocat"))?;
//! let body = source.fetch().await?;
//! ```
//!
//! Unauthenticated requests are limited to 60 per hour per client address,
//! so callers are expected to cache the result.

pub mod error;
pub mod github;

pub use error::{Result, UpstreamError};
pub use github::{GitHubConfig, GitHubGistSource};

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// A source of the raw gist listing.
#[async_trait]
pub trait GistSource: Send + Sync {
    /// Fetches the full listing body.
    async fn fetch(&self) -> Result<Bytes>;
}

#[async_trait]
impl<T: GistSource + ?Sized> GistSource for Arc<T> {
    async fn fetch(&self) -> Result<Bytes> {
        (**self).fetch().await
    }
}
