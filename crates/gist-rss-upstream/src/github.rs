//! GitHub gist listing client.

use crate::error::{Result, UpstreamError};
use crate::GistSource;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, StatusCode};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use url::Url;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Connection settings for [`GitHubGistSource`].
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API root, e.g. `https://api.github.com`.
    pub api_base_url: String,
    /// Login whose public gists are listed.
    pub user: String,
    /// `User-Agent` header; GitHub rejects requests without one.
    pub user_agent: String,
    /// Total request timeout.
    pub timeout: Duration,
}

impl GitHubConfig {
    /// Default settings for the given user.
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            user: user.into(),
            user_agent: "gist-rss".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Fetches `GET {api_base_url}/users/{user}/gists`.
pub struct GitHubGistSource {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl GitHubGistSource {
    /// Create a new client.
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let endpoint = gists_endpoint(&config.api_base_url, &config.user)?;

        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            timeout: config.timeout,
        })
    }

    /// The URL this client fetches.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_send_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::NetworkError(e.to_string())
        }
    }
}

#[async_trait]
impl GistSource for GitHubGistSource {
    async fn fetch(&self) -> Result<Bytes> {
        debug!(url = %self.endpoint, "Fetching gist listing");

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            if let Some(retry_after) = rate_limit_retry_after(status, response.headers()) {
                warn!(retry_after, "GitHub rate limit exhausted");
                return Err(UpstreamError::RateLimitExceeded(retry_after));
            }

            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        debug!(bytes = body.len(), "Fetched gist listing");
        Ok(body)
    }
}

/// Builds `{base}/users/{user}/gists`, percent-encoding the user.
fn gists_endpoint(base: &str, user: &str) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| UpstreamError::InvalidUrl(format!("{base}: {e}")))?;

    url.path_segments_mut()
        .map_err(|_| UpstreamError::InvalidUrl(format!("{base}: cannot be a base")))?
        .pop_if_empty()
        .extend(["users", user, "gists"]);

    Ok(url)
}

/// Seconds until the quota resets, if this response is a rate-limit refusal.
fn rate_limit_retry_after(status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let remaining = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if remaining != Some(0) && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let reset_at = headers
        .get(RATE_LIMIT_RESET)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Some(reset_at.saturating_sub(now))
}
