//! End-to-end tests for the feed endpoint: cache freshness, refresh, and
//! error mapping.

use async_trait::async_trait;
use axum::{body::Body, http::Request};
use bytes::Bytes;
use chrono::Utc;
use gist_rss_cache::{CacheConfig, CacheError, MemoryCache, SharedCache};
use gist_rss_feed::FeedIdentity;
use gist_rss_node::api::{create_router, AppState};
use gist_rss_node::service::FeedService;
use gist_rss_types::{GIST_KEY, LAST_UPDATE_KEY};
use gist_rss_upstream::{GistSource, UpstreamError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const LISTING: &str = r#"[
    {"id": "abc123", "html_url": "https://gist.github.com/octocat/abc123", "description": "tiny http server", "updated_at": "2024-01-15T10:00:00Z"},
    {"id": "nodesc", "html_url": "https://gist.github.com/octocat/nodesc", "description": "", "updated_at": "2024-01-14T10:00:00Z"},
    {"id": "def456", "html_url": "https://gist.github.com/octocat/def456", "description": "dotfiles", "updated_at": "2024-01-13T10:00:00Z"}
]"#;

// ==================== Test doubles ====================

/// Upstream double that counts fetches.
struct CountingSource {
    body: Bytes,
    calls: AtomicUsize,
}

impl CountingSource {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: Bytes::copy_from_slice(body.as_bytes()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GistSource for CountingSource {
    async fn fetch(&self) -> gist_rss_upstream::Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

/// Upstream double that always fails.
struct FailingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl GistSource for FailingSource {
    async fn fetch(&self) -> gist_rss_upstream::Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(UpstreamError::ApiError {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }
}

/// Cache double that records writes per key.
struct RecordingCache {
    inner: MemoryCache,
    writes: Mutex<HashMap<String, usize>>,
}

impl RecordingCache {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCache::with_defaults(),
            writes: Mutex::new(HashMap::new()),
        })
    }

    fn writes(&self, key: &str) -> usize {
        self.writes.lock().get(key).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SharedCache for RecordingCache {
    async fn get(&self, key: &str) -> gist_rss_cache::Result<Option<Bytes>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> gist_rss_cache::Result<()> {
        *self.writes.lock().entry(key.to_string()).or_default() += 1;
        self.inner.set(key, value).await
    }
}

/// Cache double whose reads fail.
struct BrokenReadCache;

#[async_trait]
impl SharedCache for BrokenReadCache {
    async fn get(&self, _key: &str) -> gist_rss_cache::Result<Option<Bytes>> {
        Err(CacheError::Backend("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: Bytes) -> gist_rss_cache::Result<()> {
        Ok(())
    }
}

/// Cache double that always misses and rejects writes.
struct BrokenWriteCache;

#[async_trait]
impl SharedCache for BrokenWriteCache {
    async fn get(&self, _key: &str) -> gist_rss_cache::Result<Option<Bytes>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Bytes) -> gist_rss_cache::Result<()> {
        Err(CacheError::Backend("out of memory".to_string()))
    }
}

/// Cache double that stores `gist` but can refuse `last_update` writes.
struct StampRejectingCache {
    inner: Arc<RecordingCache>,
    reject_stamp: AtomicBool,
}

impl StampRejectingCache {
    fn new(inner: Arc<RecordingCache>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reject_stamp: AtomicBool::new(true),
        })
    }

    fn accept_stamp(&self) {
        self.reject_stamp.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl SharedCache for StampRejectingCache {
    async fn get(&self, key: &str) -> gist_rss_cache::Result<Option<Bytes>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> gist_rss_cache::Result<()> {
        if key == LAST_UPDATE_KEY && self.reject_stamp.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("connection reset".to_string()));
        }
        self.inner.set(key, value).await
    }
}

// ==================== Helpers ====================

fn identity() -> FeedIdentity {
    FeedIdentity::new("octocat", "http://gist-rss.example.com").with_email("octo@example.com")
}

fn create_test_app(cache: Arc<dyn SharedCache>, source: Arc<dyn GistSource>) -> axum::Router {
    create_router(AppState::new(FeedService::new(cache, source, identity())))
}

fn feed_request() -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn seed(cache: &dyn SharedCache, last_update: i64, payload: &str) {
    cache
        .set(LAST_UPDATE_KEY, Bytes::from(last_update.to_string()))
        .await
        .unwrap();
    cache
        .set(GIST_KEY, Bytes::copy_from_slice(payload.as_bytes()))
        .await
        .unwrap();
}

// ==================== Success path ====================

#[tokio::test]
async fn test_cold_start_fetches_once_and_writes_each_key_once() {
    let cache = RecordingCache::new();
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/xml");
    assert_eq!(source.calls(), 1);
    assert_eq!(cache.writes(GIST_KEY), 1);
    assert_eq!(cache.writes(LAST_UPDATE_KEY), 1);

    let stored = cache.get(GIST_KEY).await.unwrap().unwrap();
    assert_eq!(&stored[..], LISTING.as_bytes());

    let stamp = cache.get(LAST_UPDATE_KEY).await.unwrap().unwrap();
    let stamp: i64 = std::str::from_utf8(&stamp).unwrap().parse().unwrap();
    assert!((Utc::now().timestamp() - stamp).abs() <= 5);
}

#[tokio::test]
async fn test_feed_contains_described_gists_in_order() {
    let cache = RecordingCache::new();
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache, source);

    let response = app.oneshot(feed_request()).await.unwrap();
    let xml = body_string(response).await;

    assert!(xml.contains("<feed") && xml.contains(r#"xmlns="http://www.w3.org/2005/Atom""#));
    assert!(xml.contains(">octocat gists</title>"));
    assert!(xml.contains("<email>octo@example.com</email>"));
    assert!(xml.contains("<id>https://gist.github.com/octocat/abc123</id>"));
    assert!(xml.contains("gist.github.com/octocat/abc123.js"));
    assert!(!xml.contains("nodesc"));
    assert_eq!(xml.matches("<entry>").count(), 2);

    let first = xml.find("abc123").unwrap();
    let second = xml.find("def456").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn test_second_request_within_window_uses_cache() {
    let cache = RecordingCache::new();
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let first = app.clone().oneshot(feed_request()).await.unwrap();
    assert_eq!(first.status(), 200);
    let second = app.clone().oneshot(feed_request()).await.unwrap();
    assert_eq!(second.status(), 200);

    assert_eq!(source.calls(), 1);
    assert_eq!(cache.writes(GIST_KEY), 1);
    assert_eq!(cache.writes(LAST_UPDATE_KEY), 1);
}

#[tokio::test]
async fn test_fresh_cache_is_served_without_fetch() {
    let cache = RecordingCache::new();
    seed(cache.as_ref(), Utc::now().timestamp(), LISTING).await;
    let source = CountingSource::new("[]");
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source.calls(), 0);
    assert!(body_string(response).await.contains("abc123"));
}

#[tokio::test]
async fn test_stale_cache_is_refreshed() {
    let cache = RecordingCache::new();
    seed(cache.as_ref(), Utc::now().timestamp() - 120, "[]").await;
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source.calls(), 1);
    assert!(body_string(response).await.contains("abc123"));

    let stored = cache.get(GIST_KEY).await.unwrap().unwrap();
    assert_eq!(&stored[..], LISTING.as_bytes());
}

#[tokio::test]
async fn test_custom_freshness_window() {
    let cache = RecordingCache::new();
    seed(cache.as_ref(), Utc::now().timestamp() - 120, LISTING).await;
    let source = CountingSource::new("[]");
    let service = FeedService::new(cache.clone(), source.clone(), identity())
        .with_freshness(std::time::Duration::from_secs(3600));
    let app = create_router(AppState::new(service));

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_evicted_timestamp_triggers_refresh() {
    let cache = RecordingCache::new();
    cache
        .set(GIST_KEY, Bytes::from_static(b"[]"))
        .await
        .unwrap();
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source.calls(), 1);
    assert_eq!(cache.writes(LAST_UPDATE_KEY), 1);
}

#[tokio::test]
async fn test_evicted_payload_triggers_single_refresh() {
    let cache = RecordingCache::new();
    cache
        .set(LAST_UPDATE_KEY, Bytes::from(Utc::now().timestamp().to_string()))
        .await
        .unwrap();
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source.calls(), 1);
    assert_eq!(cache.writes(GIST_KEY), 1);
}

#[tokio::test]
async fn test_unparsable_timestamp_triggers_refresh() {
    let cache = RecordingCache::new();
    cache
        .set(LAST_UPDATE_KEY, Bytes::from_static(b"not-a-number"))
        .await
        .unwrap();
    cache.set(GIST_KEY, Bytes::from_static(b"[]")).await.unwrap();
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_out_of_range_timestamp_triggers_refresh() {
    let cache = RecordingCache::new();
    cache
        .set(LAST_UPDATE_KEY, Bytes::from_static(b"-9223372036854775808"))
        .await
        .unwrap();
    cache.set(GIST_KEY, Bytes::from_static(b"[]")).await.unwrap();
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source.calls(), 1);
    assert!(body_string(response).await.contains("abc123"));
}

#[tokio::test]
async fn test_malformed_payload_renders_empty_feed() {
    let cache = RecordingCache::new();
    let source = CountingSource::new(r#"{"message": "API rate limit exceeded"}"#);
    let app = create_test_app(cache, source);

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    let xml = body_string(response).await;
    assert!(xml.contains(">octocat gists</title>"));
    assert!(!xml.contains("<entry>"));
}

#[tokio::test]
async fn test_feed_served_for_any_method() {
    let cache = RecordingCache::new();
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache, source);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), 200);
}

// ==================== Failure path ====================

#[tokio::test]
async fn test_cache_read_error_is_500_without_fetch() {
    let source = CountingSource::new(LISTING);
    let app = create_test_app(Arc::new(BrokenReadCache), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_string(response).await, "Internal Server Error");
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_cache_write_error_is_500() {
    let source = CountingSource::new(LISTING);
    let app = create_test_app(Arc::new(BrokenWriteCache), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(body_string(response).await, "Internal Server Error");
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_failed_timestamp_write_keeps_old_stamp_and_refreshes_again() {
    let recording = RecordingCache::new();
    let old_stamp = Utc::now().timestamp() - 120;
    seed(recording.as_ref(), old_stamp, "[]").await;
    let cache = StampRejectingCache::new(recording.clone());
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.clone().oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(body_string(response).await, "Internal Server Error");
    assert_eq!(source.calls(), 1);

    let stored = recording.get(GIST_KEY).await.unwrap().unwrap();
    assert_eq!(&stored[..], LISTING.as_bytes());
    let stamp = recording.get(LAST_UPDATE_KEY).await.unwrap().unwrap();
    assert_eq!(&stamp[..], old_stamp.to_string().as_bytes());

    cache.accept_stamp();
    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source.calls(), 2);
    let stamp = recording.get(LAST_UPDATE_KEY).await.unwrap().unwrap();
    assert_ne!(&stamp[..], old_stamp.to_string().as_bytes());
}

#[tokio::test]
async fn test_oversized_listing_is_500() {
    let cache = Arc::new(MemoryCache::new(CacheConfig {
        max_value_bytes: 16,
        ..CacheConfig::default()
    }));
    let source = CountingSource::new(LISTING);
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(source.calls(), 1);
    assert!(cache.get(GIST_KEY).await.unwrap().is_none());
    assert!(cache.get(LAST_UPDATE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upstream_error_is_500_and_cache_untouched() {
    let cache = RecordingCache::new();
    let source = Arc::new(FailingSource {
        calls: AtomicUsize::new(0),
    });
    let app = create_test_app(cache.clone(), source.clone());

    let response = app.oneshot(feed_request()).await.unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(body_string(response).await, "Internal Server Error");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.writes(GIST_KEY), 0);
    assert_eq!(cache.writes(LAST_UPDATE_KEY), 0);
}

// ==================== Ancillary routes ====================

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(RecordingCache::new(), CountingSource::new("[]"));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app(RecordingCache::new(), CountingSource::new("[]"));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = create_test_app(RecordingCache::new(), CountingSource::new("[]"));

    let response = app.oneshot(feed_request()).await.unwrap();

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
}
