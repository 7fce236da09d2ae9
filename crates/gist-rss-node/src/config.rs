//! Node configuration types.
//!
//! Settings come from an optional file overlaid by `GIST_RSS__`-prefixed
//! environment variables, e.g. `GIST_RSS__GITHUB__USER=octocat`.

use crate::observability::LogFormat;
use gist_rss_cache::CacheConfig;
use gist_rss_feed::FeedIdentity;
use gist_rss_upstream::GitHubConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "GIST_RSS";

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Configuration for the gist-rss node.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// Upstream API access.
    #[validate(nested)]
    pub github: GitHubSettings,
    /// Feed identity.
    #[validate(nested)]
    pub feed: FeedSettings,
    /// Cache behaviour.
    #[validate(nested)]
    pub cache: CacheSettings,
    /// Logging.
    pub log: LogSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the feed is served on.
    pub listen_addr: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Upstream API settings.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct GitHubSettings {
    /// Login whose gists are published.
    #[validate(length(min = 1, message = "github.user must be set"))]
    pub user: String,
    /// API root.
    #[validate(url)]
    pub api_base_url: String,
    /// User-Agent sent upstream.
    #[validate(length(min = 1))]
    pub user_agent: String,
    /// Request timeout in seconds.
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            user: String::new(),
            api_base_url: "https://api.github.com".to_string(),
            user_agent: "gist-rss".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Feed identity settings.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct FeedSettings {
    /// Public URL of the feed.
    #[validate(url)]
    pub site_url: String,
    /// Feed title; defaults to `"{user} gists"`.
    pub title: Option<String>,
    /// Author name; defaults to the GitHub user.
    pub author_name: Option<String>,
    /// Author contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Host serving gist embed scripts.
    #[validate(url)]
    pub embed_base_url: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            site_url: "http://127.0.0.1:8080".to_string(),
            title: None,
            author_name: None,
            email: None,
            embed_base_url: "https://gist.github.com".to_string(),
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct CacheSettings {
    /// Age after which the cached listing is refetched.
    #[validate(range(min = 1))]
    pub freshness_secs: u64,
    /// Maximum number of cached keys.
    #[validate(range(min = 1))]
    pub max_entries: usize,
    /// Largest cached value in bytes.
    #[validate(range(min = 1))]
    pub max_value_bytes: usize,
    /// Backend-side expiry in seconds (0 = never).
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            freshness_secs: 60,
            max_entries: defaults.max_entries,
            max_value_bytes: defaults.max_value_bytes,
            ttl_secs: 0,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Loads settings from an optional file and the environment.
    ///
    /// The result is not validated; call [`Settings::validated`] once any
    /// command-line overrides have been applied.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Checks every constraint, returning the settings unchanged on success.
    pub fn validated(self) -> Result<Self, SettingsError> {
        self.validate()?;
        Ok(self)
    }

    /// Identity passed to the feed service.
    pub fn identity(&self) -> FeedIdentity {
        let mut identity = FeedIdentity::new(&self.github.user, &self.feed.site_url)
            .with_embed_base_url(&self.feed.embed_base_url);

        if let Some(title) = &self.feed.title {
            identity = identity.with_title(title);
        }
        if let Some(name) = &self.feed.author_name {
            identity = identity.with_author_name(name);
        }
        if let Some(email) = &self.feed.email {
            identity = identity.with_email(email);
        }

        identity
    }

    /// Upstream client configuration.
    pub fn github_config(&self) -> GitHubConfig {
        GitHubConfig {
            api_base_url: self.github.api_base_url.clone(),
            user: self.github.user.clone(),
            user_agent: self.github.user_agent.clone(),
            timeout: Duration::from_secs(self.github.timeout_secs),
        }
    }

    /// Cache backend configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.cache.max_entries,
            max_value_bytes: self.cache.max_value_bytes,
            ttl: (self.cache.ttl_secs > 0).then(|| Duration::from_secs(self.cache.ttl_secs)),
        }
    }

    /// Freshness window for the cached listing.
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.cache.freshness_secs)
    }
}
