//! Title search: catalog lookup, feature building and both-horizon prediction
//! for a single search card.

use crate::application::feature_builder::FeatureBuilder;
use crate::application::insights::{CombinedInsights, InsightService};
use crate::application::prediction_service::PredictionService;
use crate::domain::errors::PredictionError;
use crate::domain::game::{GameSearchHit, pick_candidate};
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ports::GameCatalog;
use crate::domain::prediction::{Horizon, HorizonPrediction, PredictionResult};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

const SEARCH_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSearchResult {
    pub appid: u64,
    pub name: String,
    pub release_date: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub score_30d: f64,
    pub score_60d: f64,
    pub will_discount_30d: bool,
    pub will_discount_60d: bool,
    pub insights: CombinedInsights,
}

/// Single-horizon prediction for one ITAD game, with the features it was
/// built from so callers can attach insights.
#[derive(Debug, Clone)]
pub struct CatalogPrediction {
    pub prediction: HorizonPrediction,
    pub features: FeatureVector,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

pub struct TitleSearchService {
    catalog: Arc<dyn GameCatalog>,
    predictions: Arc<PredictionService>,
    insights: InsightService,
    builder: FeatureBuilder,
    country: String,
}

impl TitleSearchService {
    pub fn new(
        catalog: Arc<dyn GameCatalog>,
        predictions: Arc<PredictionService>,
        country: impl Into<String>,
    ) -> Self {
        let insights = InsightService::new(predictions.default_threshold());
        Self {
            catalog,
            predictions,
            insights,
            builder: FeatureBuilder::new(),
            country: country.into(),
        }
    }

    pub fn with_insights(mut self, insights: InsightService) -> Self {
        self.insights = insights;
        self
    }

    fn ensure_enabled(&self) -> Result<(), PredictionError> {
        if self.catalog.is_enabled() {
            Ok(())
        } else {
            Err(PredictionError::Disabled {
                reason: "ITAD integration is not configured on this deployment".to_string(),
            })
        }
    }

    /// Typeahead suggestions straight from the catalog.
    pub async fn suggest(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<GameSearchHit>, PredictionError> {
        self.ensure_enabled()?;
        let title = validate_title(title)?;
        Ok(self.catalog.search_games(title, limit).await?)
    }

    pub async fn predict_by_title(&self, title: &str) -> Result<GameSearchResult, PredictionError> {
        self.predict_by_title_at(title, Utc::now().date_naive()).await
    }

    /// Same as [`TitleSearchService::predict_by_title`] with an explicit
    /// "today", which decides whether the title counts as already released.
    pub async fn predict_by_title_at(
        &self,
        title: &str,
        today: NaiveDate,
    ) -> Result<GameSearchResult, PredictionError> {
        self.ensure_enabled()?;
        let title = validate_title(title)?;
        info!(title, "Title search requested");

        let hits = self
            .catalog
            .search_games(title, SEARCH_CANDIDATES)
            .await
            .map_err(|e| {
                error!(title, error = %e, "ITAD search failed");
                PredictionError::from(e)
            })?;
        let candidate = pick_candidate(title, &hits).ok_or_else(|| PredictionError::TitleNotFound {
            title: title.to_string(),
        })?;

        let mut info = self
            .catalog
            .game_info(&candidate.itad_id)
            .await?
            .ok_or_else(|| PredictionError::TitleNotFound {
                title: title.to_string(),
            })?;

        let appid = info.appid.unwrap_or(0);
        let name = info.title.clone().unwrap_or_else(|| candidate.title.clone());
        let image_url = info.image_url();

        // A missing live price is not fatal: the builder falls back to its default.
        match self
            .catalog
            .current_price(&candidate.itad_id, &self.country)
            .await
        {
            Ok(Some((amount, currency, shop))) => {
                info!(appid, amount, currency = %currency, shop = %shop, "Live price found");
                info.price = Some(amount);
            }
            Ok(None) => {}
            Err(e) => warn!(appid, error = %e, "Live price lookup failed"),
        }

        if info.parsed_release_date().is_some_and(|released| released < today) {
            return Ok(self.released_result(appid, name, info.release_date, info.price, image_url));
        }

        let features = self.builder.build(appid, &info);
        let result = self.predictions.predict_features(appid, &features)?;

        Ok(self.search_result(
            appid,
            name,
            info.release_date,
            info.price,
            image_url,
            &result,
            &features,
        ))
    }

    /// Builds features from ITAD metadata for `itad_id` and predicts one horizon.
    pub async fn predict_from_itad(
        &self,
        itad_id: &str,
        horizon: Horizon,
        threshold: Option<f64>,
    ) -> Result<CatalogPrediction, PredictionError> {
        self.ensure_enabled()?;
        let itad_id = itad_id.trim();
        if itad_id.is_empty() {
            return Err(PredictionError::validation("itad_id must not be empty"));
        }

        let info = self
            .catalog
            .game_info(itad_id)
            .await?
            .ok_or_else(|| PredictionError::TitleNotFound {
                title: itad_id.to_string(),
            })?;
        let appid = info
            .appid
            .filter(|id| *id > 0)
            .ok_or_else(|| PredictionError::validation("Game info from ITAD missing Steam appid"))?;

        let features = self.builder.build(appid, &info);
        let prediction = self
            .predictions
            .predict_built_horizon(appid, horizon, &features, threshold)?;

        Ok(CatalogPrediction {
            prediction,
            features,
            image_url: info.image_url(),
            name: info.title,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn search_result(
        &self,
        appid: u64,
        name: String,
        release_date: Option<String>,
        price: Option<f64>,
        image_url: Option<String>,
        result: &PredictionResult,
        features: &FeatureVector,
    ) -> GameSearchResult {
        let insights = self.insights.combined(result, features);
        GameSearchResult {
            appid,
            name,
            release_date,
            price,
            image_url,
            score_30d: insights.score_30d,
            score_60d: insights.score_60d,
            will_discount_30d: insights.will_discount_30d,
            will_discount_60d: insights.will_discount_60d,
            insights,
        }
    }

    /// Launch-window forecasts make no sense for released games.
    fn released_result(
        &self,
        appid: u64,
        name: String,
        release_date: Option<String>,
        price: Option<f64>,
        image_url: Option<String>,
    ) -> GameSearchResult {
        info!(appid, "Title already released, returning informational result");
        GameSearchResult {
            appid,
            name,
            release_date,
            price,
            image_url,
            score_30d: 0.0,
            score_60d: 0.0,
            will_discount_30d: false,
            will_discount_60d: false,
            insights: CombinedInsights {
                score_30d: 0.0,
                score_60d: 0.0,
                will_discount_30d: false,
                will_discount_60d: false,
                decision: self.predictions.policy().decide(0.0, 0.0),
                contextual_factors: Vec::new(),
                bullets: vec![
                    "This game has already released.".to_string(),
                    "WaitForIt focuses on upcoming titles and launch-window discounts.".to_string(),
                    "Please check current store prices directly for real-time deals.".to_string(),
                ],
            },
        }
    }
}

fn validate_title(title: &str) -> Result<&str, PredictionError> {
    let title = title.trim();
    if title.is_empty() {
        Err(PredictionError::validation("title must not be empty"))
    } else {
        Ok(title)
    }
}
