//! # gist-rss Node
//!
//! Serves a user's public gists as an Atom feed.
//!
//! ```text
//! GET /  ──▶ FeedService ──▶ SharedCache (last_update, gist)
//!                │                 ▲
//!                │ stale or missing│ write both
//!                ▼                 │
//!           GistSource ────────────┘
//!                │
//!                ▼
//!      FeedDocument ──▶ Atom XML
//! ```
//!
//! The upstream API allows 60 unauthenticated requests per hour, so the raw
//! listing is cached and only refetched once it is older than the freshness
//! window (one minute by default).
//!
//! ## Modules
//!
//! - [`api`] - HTTP router and handlers
//! - [`service`] - cache freshness check, refresh, rendering
//! - [`config`] - settings loading and validation
//! - [`error`] - handler errors and their HTTP mapping
//! - [`observability`] - logging and request tracing
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gist_rss_cache::MemoryCache;
//! use gist_rss_feed::FeedIdentity;
//! use gist_rss_node::api::{create_router, AppState};
//! use gist_rss_node::service::FeedService;
//! use gist_rss_upstream::{GitHubConfig, GitHubGistSource};
//!
//! # fn build() -> Result<axum::Router, Box<dyn std::error::Error>> {
//! let cache = Arc::new(MemoryCache::with_defaults());
//! let source = Arc::new(GitHubGistSource::new(GitHubConfig::for_user("octocat"))?);
//! let identity = FeedIdentity::new("octocat", "http://127.0.0.1:8080");
//!
//! let app = create_router(AppState::new(FeedService::new(cache, source, identity)));
//! # Ok(app)
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod observability;
pub mod service;
