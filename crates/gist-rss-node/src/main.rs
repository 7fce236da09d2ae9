//! gist-rss node - serves a user's public gists as an Atom feed.

use anyhow::Context;
use clap::Parser;
use gist_rss_cache::MemoryCache;
use gist_rss_node::api::{create_router, AppState};
use gist_rss_node::config::Settings;
use gist_rss_node::observability::{init_logging, LogFormat};
use gist_rss_node::service::FeedService;
use gist_rss_upstream::GitHubGistSource;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// gist-rss - an Atom feed of a user's public gists
#[derive(Parser, Debug)]
#[command(name = "gist-rss-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.listen_addr`
    #[arg(long)]
    listen_addr: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(addr) = args.listen_addr {
        settings.server.listen_addr = addr;
    }
    if let Some(level) = args.log_level {
        settings.log.level = level;
    }
    if let Some(format) = args.log_format.as_deref() {
        settings.log.format = LogFormat::parse(format);
    }
    let settings = settings.validated()?;

    init_logging(&settings.log.level, settings.log.format);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting gist-rss node");
    tracing::info!(
        listen_addr = %settings.server.listen_addr,
        user = %settings.github.user,
        site_url = %settings.feed.site_url,
        freshness_secs = settings.cache.freshness_secs,
        "Node configuration"
    );

    let cache = Arc::new(MemoryCache::new(settings.cache_config()));
    let source = Arc::new(
        GitHubGistSource::new(settings.github_config())
            .context("failed to build upstream client")?,
    );
    tracing::info!(endpoint = %source.endpoint(), "Upstream gist source ready");

    let service = FeedService::new(cache, source, settings.identity())
        .with_freshness(settings.freshness());
    let app = create_router(AppState::new(service));

    let listener = TcpListener::bind(settings.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.listen_addr))?;

    tracing::info!("Node is ready. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("gist-rss node stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
