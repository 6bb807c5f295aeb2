mod catalog;
mod config;
mod db;
mod errors;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::source::{CatalogSource, JsonFileSource, PostgresSource};
use crate::catalog::store::CatalogStore;
use crate::config::{Config, MatchStrategy};
use crate::db::create_pool;
use crate::matching::engine::ProfileMatcher;
use crate::matching::keyword::{KeywordMatcher, SignalWeights};
use crate::matching::tfidf::TfIdfMatcher;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Architecture API v{}", env!("CARGO_PKG_VERSION"));

    // Catalog source: PostgreSQL when DATABASE_URL is set, JSON file otherwise
    let source: Arc<dyn CatalogSource> = match &config.database_url {
        Some(url) => Arc::new(PostgresSource::new(create_pool(url).await?)),
        None => Arc::new(JsonFileSource::new(config.catalog_path.clone())),
    };
    let catalog = CatalogStore::open(source)
        .await
        .context("failed to load the job profile catalog")?;

    let matcher = build_matcher(&config)?;
    info!(
        "Profile matcher: {} (min score {}, vector cache {})",
        matcher.backend(),
        config.match_min_score,
        config.cache_vectors
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        catalog,
        matcher,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Selects the scoring policy named by MATCH_STRATEGY.
fn build_matcher(config: &Config) -> Result<Arc<dyn ProfileMatcher>> {
    match config.match_strategy {
        MatchStrategy::TfIdf if config.cache_vectors => Ok(Arc::new(TfIdfMatcher::with_cache())),
        MatchStrategy::TfIdf => Ok(Arc::new(TfIdfMatcher::new())),
        MatchStrategy::Keyword => {
            let weights = match &config.signal_weights_path {
                Some(path) => SignalWeights::from_file(path)?,
                None => {
                    info!("No MATCH_SIGNAL_WEIGHTS_PATH set; every field weighs 1");
                    SignalWeights::default()
                }
            };
            Ok(Arc::new(KeywordMatcher::new(weights)))
        }
    }
}
