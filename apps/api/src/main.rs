mod activity;
mod catalog;
mod config;
mod db;
mod errors;
mod listing;
mod models;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::activity::ActivityLogger;
use crate::catalog::JobCatalog;
use crate::config::{Config, StoreBackend};
use crate::db::create_pool;
use crate::listing::fuzzy::ApproximateSearcher;
use crate::listing::session::SessionRegistry;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;
use crate::store::rest::RestStore;
use crate::store::{ActivitySink, JobStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing backend or malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job board API v{}", env!("CARGO_PKG_VERSION"));

    let (jobs, sink) = build_store(&config).await?;
    info!("Job store initialized ({} backend)", jobs.backend());

    // Initial fetch. The service still starts on failure; POST /api/v1/jobs/refresh retries.
    let catalog = Arc::new(JobCatalog::new(jobs));
    if let Err(e) = catalog.refresh().await {
        warn!("Initial job fetch failed, starting with an empty listing: {e}");
    }

    let settings = config.listing_settings();
    info!(
        "Listing settings: page size {}, fuzzy thresholds {}/{}",
        settings.page_size, settings.strict_threshold, settings.base_threshold
    );

    let state = AppState {
        catalog,
        sessions: Arc::new(SessionRegistry::new(config.session_idle_ttl())),
        activity: ActivityLogger::new(sink),
        searcher: Arc::new(ApproximateSearcher::default()),
        settings,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the configured backend. The same store serves job reads and activity writes.
async fn build_store(config: &Config) -> Result<(Arc<dyn JobStore>, Arc<dyn ActivitySink>)> {
    match &config.backend {
        StoreBackend::Postgres { database_url } => {
            let pool = create_pool(database_url).await?;
            let store = Arc::new(PgStore::new(pool, config.tables.clone()));
            let jobs: Arc<dyn JobStore> = store.clone();
            let sink: Arc<dyn ActivitySink> = store;
            Ok((jobs, sink))
        }
        StoreBackend::Rest { base_url, anon_key } => {
            let store = RestStore::new(base_url, anon_key.clone(), config.tables.clone())
                .context("Failed to build REST store client")?;
            let store = Arc::new(store);
            let jobs: Arc<dyn JobStore> = store.clone();
            let sink: Arc<dyn ActivitySink> = store;
            Ok((jobs, sink))
        }
    }
}
