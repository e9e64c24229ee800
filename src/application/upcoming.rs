//! Offline precompute of upcoming-game predictions.
//!
//! Reads a seed CSV (`name,release_date,price`), optionally enriches each row
//! from the game catalog, predicts both horizons and writes the JSON file
//! served by `GET /games/upcoming`.

use crate::application::feature_builder::FeatureBuilder;
use crate::application::insights::{CombinedInsights, InsightService};
use crate::application::prediction_service::PredictionService;
use crate::domain::errors::PredictionError;
use crate::domain::game::{GameInfo, pick_candidate};
use crate::domain::ports::GameCatalog;
use crate::domain::prediction::{Decision, Horizon};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Used when neither the seed nor the catalog knows the price.
pub const FALLBACK_SEED_PRICE: f64 = 39.99;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpcomingSeed {
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<f64>,
}

/// One precomputed card. The unsuffixed `score` / `will_discount` /
/// `threshold` fields mirror the 30-day horizon for older clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingGame {
    pub appid: u64,
    pub name: String,
    pub release_date: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub horizon: Horizon,
    pub will_discount: bool,
    pub score: f64,
    pub threshold: f64,
    pub score_30d: f64,
    pub will_discount_30d: bool,
    pub threshold_30d: f64,
    pub score_60d: f64,
    pub will_discount_60d: bool,
    pub threshold_60d: f64,
    pub decision: Decision,
    pub insights: Option<CombinedInsights>,
}

#[derive(Debug, Error)]
pub enum UpcomingError {
    #[error("Upcoming games data not generated yet")]
    NotGenerated,

    #[error("Failed to load upcoming games data: {0}")]
    Invalid(String),
}

/// Strips currency symbols; anything unparseable counts as unknown.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '£' | '€'))
        .collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_price))
}

pub fn read_seed(path: &Path) -> Result<Vec<UpcomingSeed>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open seed file {}", path.display()))?;

    let mut seeds = Vec::new();
    for (idx, row) in reader.deserialize::<UpcomingSeed>().enumerate() {
        match row {
            Ok(seed) if seed.name.trim().is_empty() => {}
            Ok(mut seed) => {
                seed.release_date = seed.release_date.filter(|d| !d.trim().is_empty());
                seeds.push(seed);
            }
            Err(e) => warn!("Skipping malformed seed row {}: {}", idx + 1, e),
        }
    }
    Ok(seeds)
}

pub fn write_upcoming(path: &Path, games: &[UpcomingGame]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(games)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub async fn load_upcoming(path: &Path) -> Result<Vec<UpcomingGame>, UpcomingError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UpcomingError::NotGenerated);
        }
        Err(e) => return Err(UpcomingError::Invalid(e.to_string())),
    };
    serde_json::from_str(&raw).map_err(|e| {
        warn!("Upcoming file {} is invalid: {}", path.display(), e);
        UpcomingError::Invalid(e.to_string())
    })
}

pub struct UpcomingPrecomputer {
    predictions: Arc<PredictionService>,
    catalog: Option<Arc<dyn GameCatalog>>,
    insights: InsightService,
    builder: FeatureBuilder,
}

impl UpcomingPrecomputer {
    pub fn new(predictions: Arc<PredictionService>, catalog: Option<Arc<dyn GameCatalog>>) -> Self {
        let insights = InsightService::new(predictions.default_threshold());
        Self {
            predictions,
            catalog: catalog.filter(|c| c.is_enabled()),
            insights,
            builder: FeatureBuilder::new(),
        }
    }

    pub fn with_insights(mut self, insights: InsightService) -> Self {
        self.insights = insights;
        self
    }

    /// Rows that fail are logged and left out of the output.
    pub async fn run(&self, seeds: &[UpcomingSeed]) -> Vec<UpcomingGame> {
        let mut records = Vec::with_capacity(seeds.len());
        for seed in seeds {
            match self.compute(seed).await {
                Ok(record) => records.push(record),
                Err(e) => warn!(game_name = %seed.name, error = %e, "Upcoming prediction failed"),
            }
        }
        info!("Precomputed {} of {} upcoming games", records.len(), seeds.len());
        records
    }

    pub async fn compute(&self, seed: &UpcomingSeed) -> Result<UpcomingGame, PredictionError> {
        let enriched = self.enrich(&seed.name).await;

        // Catalog values win over the seed.
        let mut game = enriched.unwrap_or_default();
        if game.release_date.is_none() {
            game.release_date = seed.release_date.clone();
        }
        let price = game
            .price
            .or(seed.price)
            .unwrap_or(FALLBACK_SEED_PRICE);
        game.price = Some(price);

        let appid = game.appid.unwrap_or(0);
        let features = self.builder.build(appid, &game);
        let result = self.predictions.predict_features(appid, &features)?;
        let threshold = self.predictions.default_threshold();
        let insights = self.insights.combined(&result, &features);

        Ok(UpcomingGame {
            appid,
            name: seed.name.clone(),
            release_date: game.release_date.clone(),
            price,
            image_url: game.image_url(),
            horizon: Horizon::Days30,
            will_discount: insights.will_discount_30d,
            score: result.probability_30d,
            threshold,
            score_30d: result.probability_30d,
            will_discount_30d: insights.will_discount_30d,
            threshold_30d: threshold,
            score_60d: result.probability_60d,
            will_discount_60d: insights.will_discount_60d,
            threshold_60d: threshold,
            decision: result.decision,
            insights: Some(insights),
        })
    }

    /// Best-effort catalog lookup; failures fall back to the seed row.
    async fn enrich(&self, name: &str) -> Option<GameInfo> {
        let catalog = self.catalog.as_ref()?;

        let hits = match catalog.search_games(name, 5).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(game_name = name, error = %e, "Catalog enrichment failed");
                return None;
            }
        };
        let candidate = pick_candidate(name, &hits)?;
        info!(game_name = name, itad_id = %candidate.itad_id, "Catalog candidate found");

        match catalog.game_info(&candidate.itad_id).await {
            Ok(info) => info,
            Err(e) => {
                warn!(game_name = name, error = %e, "Catalog enrichment failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$59.99"), Some(59.99));
        assert_eq!(parse_price(" €19 "), Some(19.0));
        assert_eq!(parse_price("TBA"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_read_seed_skips_blank_names() {
        let dir = std::env::temp_dir().join(format!("waitforit-seed-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("seed.csv");
        std::fs::write(
            &path,
            "name,release_date,price\nHollow Knight: Silksong,2025-09-04,$19.99\n,2025-01-01,10\nGTA VI,,\n",
        )
        .unwrap();

        let seeds = read_seed(&path).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].price, Some(19.99));
        assert_eq!(seeds[1].name, "GTA VI");
        assert_eq!(seeds[1].release_date, None);
        assert_eq!(seeds[1].price, None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_load_missing_file_is_not_generated() {
        let err = load_upcoming(Path::new("/nonexistent/upcoming.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpcomingError::NotGenerated));
    }
}
