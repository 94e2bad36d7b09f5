mod advisor_client;
mod assessment;
mod config;
mod errors;
mod ingest;
mod models;
mod navigation;
mod pending;
mod progress;
mod recommendation;
mod roadmap;
mod routes;
mod state;
mod workflow;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::advisor_client::HttpAdvisor;
use crate::config::Config;
use crate::ingest::PdfExtractSource;
use crate::progress::store::JsonFileStore;
use crate::progress::ProgressTracker;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PathPilot v{}", env!("CARGO_PKG_VERSION"));

    let advisor = HttpAdvisor::new(&config.advisor_base_url, config.advisor_timeout)
        .context("Failed to build advisor HTTP client")?;
    info!(
        "Advisor client initialized (base: {}, timeout: {:?})",
        config.advisor_base_url, config.advisor_timeout
    );

    let store = JsonFileStore::open(&config.data_dir).with_context(|| {
        format!("Failed to open data directory {}", config.data_dir.display())
    })?;
    info!("Progress store at {}", store.root().display());

    let state = AppState::new(
        config.clone(),
        Arc::new(advisor),
        Arc::new(PdfExtractSource),
        ProgressTracker::new(Arc::new(store)),
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
