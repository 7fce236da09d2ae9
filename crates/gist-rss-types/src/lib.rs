//! Common types used throughout `gist-rss`.
//!
//! This crate provides the data model shared by the cache, the upstream
//! client, the feed encoder and the node.

mod gist;

pub use gist::GistRecord;

/// Cache key holding the Unix time (decimal seconds) of the last refresh.
pub const LAST_UPDATE_KEY: &str = "last_update";

/// Cache key holding the raw upstream gist listing.
pub const GIST_KEY: &str = "gist";
