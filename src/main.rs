use anyhow::{Context, Result};
use clap::Parser;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod congestion;
mod fetcher;
mod interpolate;
mod monitor;
mod odpt_types;
mod progress;
mod render;
mod server;
mod state;
#[cfg(test)]
mod test_support;

use config::Config;
use fetcher::OdptClient;
use monitor::Monitor;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    if config.api_key.is_empty() {
        info!("ODPT_API_KEY is empty; upstream requests will be unauthenticated");
    }

    // 1. Live slots and the upstream client
    let (slots, live) = state::channel();
    let client = OdptClient::new(
        config.base_url.as_str(),
        config.api_key.as_str(),
        config.language.as_str(),
        config.request_timeout(),
    )
    .context("building HTTP client")?;

    // 2. Polling tasks
    let monitor = Monitor::start(Arc::new(client), slots, config.schedule());

    // 3. HTTP Server
    let routes = server::routes(live, config.language.as_str().into());
    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(
            ([0, 0, 0, 0], config.port),
            shutdown_signal(tokio::signal::ctrl_c()),
        )
        .with_context(|| format!("binding port {}", config.port))?;
    info!(%addr, "server running");

    server.await;

    info!("shutting down");
    monitor.shutdown().await;
    Ok(())
}

/// Resolves when `signal` fires. If the listener could not be installed the
/// error is logged and this never resolves, so the server keeps running.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!(error = %e, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}
