//! Mapping from gist records to feed entries.

use crate::document::FeedIdentity;
use chrono::{DateTime, FixedOffset, Utc};
use gist_rss_types::GistRecord;

/// One feed entry, derived from a described gist.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// Entry title (the gist description).
    pub title: String,
    /// Link to the gist page.
    pub link: String,
    /// Stable entry id (the gist page URL).
    pub id: String,
    /// Last update of the gist.
    pub updated: DateTime<FixedOffset>,
    /// HTML snippet that embeds the gist.
    pub content: String,
}

impl FeedEntry {
    /// Builds the entry for a gist.
    pub fn from_gist(gist: &GistRecord, identity: &FeedIdentity) -> Self {
        Self {
            title: gist.description.clone(),
            link: gist.html_url.clone(),
            id: gist.html_url.clone(),
            updated: parse_timestamp(&gist.updated_at),
            content: identity.embed_snippet(&gist.id),
        }
    }
}

/// Maps described gists to entries, in listing order.
pub fn build_entries(gists: &[GistRecord], identity: &FeedIdentity) -> Vec<FeedEntry> {
    gists
        .iter()
        .filter(|gist| gist.is_listed())
        .map(|gist| FeedEntry::from_gist(gist, identity))
        .collect()
}

/// Parses an RFC 3339 timestamp; anything else maps to the Unix epoch.
pub fn parse_timestamp(value: &str) -> DateTime<FixedOffset> {
    // The default `DateTime<Utc>` is the epoch.
    DateTime::parse_from_rfc3339(value)
        .unwrap_or_else(|_| DateTime::<Utc>::default().fixed_offset())
}
