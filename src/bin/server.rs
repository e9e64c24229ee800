//! WaitForIt Server - Steam first-discount prediction API
//!
//! Loads both model artifacts at startup and serves predictions over HTTP.
//! A missing or corrupt artifact aborts startup with a non-zero exit code.
//!
//! # Usage
//! ```sh
//! FEATURE_DB_URL=sqlite://features.db cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `MODEL_30D_PATH`, `MODEL_60D_PATH`, `FEATURES_PATH` - Model artifacts (required)
//! - `FEATURE_DB_URL` / `FEATURE_JSON_PATH` - Feature store backends
//! - `ITAD_API_KEY` - Enables title search and live metadata
//! - `LOG_FORMAT` - `pretty` (default) or `json`
//! - `OBSERVABILITY_ENABLED` - Serve Prometheus metrics on `/metrics` (default: true)

use anyhow::Result;
use tracing::info;
use waitforit::application::bootstrap::{FeatureSourceBootstrap, ServicesBootstrap};
use waitforit::config::Config;
use waitforit::infrastructure::Metrics;
use waitforit::infrastructure::observability::init_tracing;
use waitforit::interfaces::http::{AppState, api_routes, log_request};
use warp::Filter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Config errors surface through main's Err before logging exists
    let config = Config::from_env()?;
    init_tracing(config.server.log_format);

    info!("WaitForIt Server {} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: Env={}, Bind={}:{}",
        config.server.app_env, config.server.bind_address, config.server.port
    );

    let catalog = ServicesBootstrap::catalog(&config);
    let features = FeatureSourceBootstrap::init(&config, Some(catalog.clone())).await?;
    let services = ServicesBootstrap::init(&config, catalog, features.source.clone())?;

    let health = services.predictions.health();
    info!(
        "Models ready: 30d={} 60d={}",
        health.model_30d_version, health.model_60d_version
    );

    let metrics = if config.observability.enabled {
        info!("Prometheus metrics exposed on /metrics");
        Some(Metrics::new()?)
    } else {
        info!("Metrics disabled.");
        None
    };

    let state = AppState {
        predictions: services.predictions,
        search: services.search,
        insights: services.insights,
        metrics,
        upcoming_path: config.server.upcoming_path.clone(),
    };

    let routes = api_routes(state).with(warp::log::custom(log_request));
    let (addr, server) = warp::serve(routes).try_bind_with_graceful_shutdown(
        (config.server.bind_address, config.server.port),
        async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received. Draining connections...");
        },
    )?;

    info!("Server listening on http://{}. Press Ctrl+C to shutdown.", addr);
    server.await;

    // Pool is closed only after the last in-flight request finished
    if let Some(db) = features.db {
        db.pool.close().await;
    }
    info!("Server stopped.");

    Ok(())
}
