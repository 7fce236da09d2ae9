//! Handler error type.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use gist_rss_cache::CacheError;
use gist_rss_feed::FeedError;
use gist_rss_upstream::UpstreamError;

/// Body sent with every failed feed request.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Reasons a feed request can fail.
///
/// Every variant is answered with the same generic 500; the cause is only
/// logged.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("cache read failed: {0}")]
    CacheRead(#[source] CacheError),
    #[error("cache write failed: {0}")]
    CacheWrite(#[source] CacheError),
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Encode(#[from] FeedError),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Failed to serve feed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            INTERNAL_ERROR_BODY,
        )
            .into_response()
    }
}
