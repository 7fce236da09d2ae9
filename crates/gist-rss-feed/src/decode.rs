//! Lenient decoding of the cached gist listing.

use gist_rss_types::GistRecord;
use serde_json::Value;
use tracing::{debug, warn};

/// Decodes a raw listing into gist records.
///
/// A payload that is not a JSON array yields an empty list. Array elements
/// that are not gist objects are skipped; the rest keep their upstream order.
pub fn decode_gists(payload: &[u8]) -> Vec<GistRecord> {
    let values: Vec<Value> = match serde_json::from_slice(payload) {
        Ok(values) => values,
        Err(e) => {
            warn!(
                error = %e,
                bytes = payload.len(),
                "Cached gist payload is not a JSON array, rendering empty feed"
            );
            return Vec::new();
        }
    };

    let total = values.len();
    let records: Vec<GistRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(index, error = %e, "Skipping malformed gist record");
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            total, "Dropped malformed gist records"
        );
    }

    records
}
