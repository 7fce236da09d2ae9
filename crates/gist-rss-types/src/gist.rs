//! Gist records as returned by the upstream listing.

use serde::{Deserialize, Serialize};

/// One public gist from the upstream listing.
///
/// Only the fields the feed needs are kept; everything else in the upstream
/// object is ignored. Missing string fields decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistRecord {
    /// Upstream gist identifier.
    #[serde(default)]
    pub id: String,
    /// Canonical web URL of the gist.
    #[serde(default)]
    pub html_url: String,
    /// Free-form description; may be empty or `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Last-updated timestamp, ISO-8601.
    #[serde(default)]
    pub updated_at: String,
}

impl GistRecord {
    /// Returns true if the gist has a description and should appear in the feed.
    pub fn is_listed(&self) -> bool {
        !self.description.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
