//! The feed service: keeps a recent copy of the gist listing in the shared
//! cache and renders it as Atom.
//!
//! Each request reads `last_update` and `gist` from the cache, decides once
//! whether a refresh is needed, performs at most one upstream fetch, and
//! renders from whatever payload it ends up with. Concurrent requests may
//! race to refresh; the last writer wins.

use crate::error::HandlerError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use gist_rss_cache::SharedCache;
use gist_rss_feed::{FeedDocument, FeedIdentity};
use gist_rss_types::{GIST_KEY, LAST_UPDATE_KEY};
use gist_rss_upstream::GistSource;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default age after which the cached listing is refetched.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60);

/// Why a request refreshes the cached listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// No `last_update` entry: first request, or the cache evicted it.
    NeverUpdated,
    /// No `gist` entry.
    MissingPayload,
    /// `last_update` is not a decimal Unix timestamp.
    InvalidTimestamp,
    /// The listing is older than the freshness window.
    Stale {
        /// Age in seconds.
        age_secs: i64,
    },
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshReason::NeverUpdated => write!(f, "never updated"),
            RefreshReason::MissingPayload => write!(f, "payload missing"),
            RefreshReason::InvalidTimestamp => write!(f, "invalid timestamp"),
            RefreshReason::Stale { age_secs } => write!(f, "stale ({age_secs}s old)"),
        }
    }
}

/// Decides whether the cached state needs a refresh.
pub fn refresh_reason(
    last_update: Option<&[u8]>,
    has_payload: bool,
    now: DateTime<Utc>,
    freshness: Duration,
) -> Option<RefreshReason> {
    let Some(raw) = last_update else {
        return Some(RefreshReason::NeverUpdated);
    };
    if !has_payload {
        return Some(RefreshReason::MissingPayload);
    }

    let Some(updated) = std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
    else {
        return Some(RefreshReason::InvalidTimestamp);
    };

    let Some(age_secs) = now.timestamp().checked_sub(updated) else {
        return Some(RefreshReason::InvalidTimestamp);
    };
    let window = i64::try_from(freshness.as_secs()).unwrap_or(i64::MAX);
    (age_secs > window).then_some(RefreshReason::Stale { age_secs })
}

/// Renders the Atom feed for one user.
pub struct FeedService {
    cache: Arc<dyn SharedCache>,
    source: Arc<dyn GistSource>,
    identity: FeedIdentity,
    freshness: Duration,
}

impl FeedService {
    /// Creates a service with the default freshness window.
    pub fn new(
        cache: Arc<dyn SharedCache>,
        source: Arc<dyn GistSource>,
        identity: FeedIdentity,
    ) -> Self {
        Self {
            cache,
            source,
            identity,
            freshness: DEFAULT_FRESHNESS,
        }
    }

    /// Overrides the freshness window.
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Produces the Atom XML for the current listing.
    pub async fn render(&self) -> Result<Vec<u8>, HandlerError> {
        let payload = self.snapshot().await?;
        let document = FeedDocument::from_payload(&payload, &self.identity, Utc::now());
        debug!(entries = document.entries.len(), "Rendering feed");
        Ok(document.encode()?)
    }

    /// Returns a listing no older than the freshness window, refreshing the
    /// cache if needed.
    pub async fn snapshot(&self) -> Result<Bytes, HandlerError> {
        let last_update = self
            .cache
            .get(LAST_UPDATE_KEY)
            .await
            .map_err(HandlerError::CacheRead)?;
        let payload = self
            .cache
            .get(GIST_KEY)
            .await
            .map_err(HandlerError::CacheRead)?;

        let reason = refresh_reason(
            last_update.as_deref(),
            payload.is_some(),
            Utc::now(),
            self.freshness,
        );

        match (reason, payload) {
            (None, Some(payload)) => {
                debug!(bytes = payload.len(), "Serving cached gist listing");
                Ok(payload)
            }
            (reason, _) => {
                self.refresh(reason.unwrap_or(RefreshReason::MissingPayload))
                    .await
            }
        }
    }

    /// Fetches the listing and stores it together with the fetch time.
    ///
    /// `gist` is written before `last_update`, so a failed second write
    /// leaves the old timestamp and the next request refreshes again.
    async fn refresh(&self, reason: RefreshReason) -> Result<Bytes, HandlerError> {
        info!(%reason, "Refreshing gist listing");

        let body = self.source.fetch().await?;
        let fetched_at = Utc::now().timestamp();

        self.cache
            .set(GIST_KEY, body.clone())
            .await
            .map_err(HandlerError::CacheWrite)?;
        self.cache
            .set(LAST_UPDATE_KEY, Bytes::from(fetched_at.to_string()))
            .await
            .map_err(HandlerError::CacheWrite)?;

        info!(bytes = body.len(), fetched_at, "Gist listing refreshed");
        Ok(body)
    }
}
