//! # gist-rss Feed
//!
//! Pure transformation from a cached gist listing to Atom XML:
//!
//! ```text
//! raw JSON bytes ──decode──▶ GistRecord* ──map──▶ FeedEntry* ──assemble──▶ FeedDocument ──encode──▶ XML
//! ```
//!
//! Decoding is lenient: malformed payloads and records are dropped with a
//! warning instead of failing the request. Timestamps that do not parse as
//! RFC 3339 render as the Unix epoch.

pub mod decode;
pub mod document;
pub mod entry;
pub mod error;

pub use decode::decode_gists;
pub use document::{FeedDocument, FeedIdentity};
pub use entry::{build_entries, parse_timestamp, FeedEntry};
pub use error::{FeedError, Result};
