//! HTTP API for the gist-rss node.

use axum::{
    extract::State,
    http::header,
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::HandlerError;
use crate::observability::request_id_middleware;
use crate::service::FeedService;

/// Content type of the feed response.
pub const FEED_CONTENT_TYPE: &str = "application/xml";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Feed renderer.
    pub feed: Arc<FeedService>,
}

impl AppState {
    /// Wraps a feed service.
    pub fn new(feed: FeedService) -> Self {
        Self {
            feed: Arc::new(feed),
        }
    }
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(serve_feed))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Serves the Atom feed.
async fn serve_feed(State(state): State<AppState>) -> Result<Response, HandlerError> {
    let body = state.feed.render().await?;
    Ok(([(header::CONTENT_TYPE, FEED_CONTENT_TYPE)], body).into_response())
}
