use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::application::insights::InsightService;
use crate::application::ml::ModelSet;
use crate::application::prediction_service::PredictionService;
use crate::application::search::TitleSearchService;
use crate::config::Config;
use crate::domain::ports::{FeatureSource, GameCatalog};
use crate::infrastructure::ItadClient;

pub struct ServicesHandle {
    pub catalog: Arc<dyn GameCatalog>,
    pub predictions: Arc<PredictionService>,
    pub search: Arc<TitleSearchService>,
    pub insights: InsightService,
}

pub struct ServicesBootstrap;

impl ServicesBootstrap {
    pub fn catalog(config: &Config) -> Arc<dyn GameCatalog> {
        let client = ItadClient::new(&config.itad);
        if client.is_enabled() {
            info!("ITAD integration enabled (country {})", config.itad.country);
        } else {
            info!("ITAD_API_KEY not set: title search and live enrichment disabled");
        }
        Arc::new(client)
    }

    /// Fails when either model artifact cannot be loaded.
    pub fn init(
        config: &Config,
        catalog: Arc<dyn GameCatalog>,
        features: Arc<dyn FeatureSource>,
    ) -> Result<ServicesHandle> {
        let models = ModelSet::load(&config.models).context("Failed to load model artifacts")?;
        let policy = config.decision.policy()?;

        let predictions = Arc::new(
            PredictionService::new(models, features, policy)
                .with_default_threshold(config.decision.default_threshold),
        );
        let insights = InsightService::new(config.decision.default_threshold);
        let search = Arc::new(
            TitleSearchService::new(catalog.clone(), predictions.clone(), config.itad.country.clone())
                .with_insights(insights.clone()),
        );

        Ok(ServicesHandle {
            catalog,
            predictions,
            search,
            insights,
        })
    }
}
