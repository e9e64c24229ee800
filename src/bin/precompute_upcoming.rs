//! Scores a seed list of upcoming releases and writes the JSON file served by
//! `GET /games/upcoming`.
//!
//! # Usage
//! ```sh
//! cargo run --bin precompute_upcoming -- --seed artifacts/upcoming_seed.csv
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use waitforit::application::bootstrap::ServicesBootstrap;
use waitforit::application::upcoming::{UpcomingPrecomputer, read_seed, write_upcoming};
use waitforit::config::Config;
use waitforit::infrastructure::JsonFeatureStore;
use waitforit::infrastructure::observability::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV with `name,release_date,price` columns
    #[arg(long, default_value = "artifacts/upcoming_seed.csv")]
    seed: PathBuf,

    /// Destination JSON (defaults to UPCOMING_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip ITAD enrichment even when ITAD_API_KEY is set
    #[arg(long, default_value_t = false)]
    no_itad: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = Config::from_env()?;
    init_tracing(config.server.log_format);

    let output = args
        .output
        .unwrap_or_else(|| config.server.upcoming_path.clone());

    let seeds = read_seed(&args.seed)
        .with_context(|| format!("Failed to read seed list {}", args.seed.display()))?;
    if seeds.is_empty() {
        bail!("Seed list {} has no usable rows", args.seed.display());
    }
    info!("Loaded {} seed rows from {}", seeds.len(), args.seed.display());

    // Every record is scored from built features; the store is never queried
    let catalog = ServicesBootstrap::catalog(&config);
    let services =
        ServicesBootstrap::init(&config, catalog.clone(), Arc::new(JsonFeatureStore::default()))?;

    let enrichment = (!args.no_itad).then_some(catalog);
    let precomputer = UpcomingPrecomputer::new(services.predictions, enrichment)
        .with_insights(services.insights);

    let games = precomputer.run(&seeds).await;
    write_upcoming(&output, &games)?;
    info!("Wrote {} upcoming predictions to {}", games.len(), output.display());

    Ok(())
}
