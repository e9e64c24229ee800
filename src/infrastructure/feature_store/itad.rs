use crate::application::feature_builder::FeatureBuilder;
use crate::domain::errors::{ItadError, PredictionError};
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ports::{FeatureSource, GameCatalog};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds features on the fly from IsThereAnyDeal metadata.
pub struct ItadFeatureSource {
    catalog: Arc<dyn GameCatalog>,
    builder: FeatureBuilder,
}

impl ItadFeatureSource {
    pub fn new(catalog: Arc<dyn GameCatalog>) -> Self {
        Self {
            catalog,
            builder: FeatureBuilder::new(),
        }
    }

    fn unavailable(app_id: u64, err: ItadError) -> PredictionError {
        if !matches!(err, ItadError::Disabled) {
            warn!("ITAD feature lookup failed for {}: {}", app_id, err);
        }
        PredictionError::data_unavailable(app_id, err.to_string())
    }
}

#[async_trait]
impl FeatureSource for ItadFeatureSource {
    async fn resolve(&self, app_id: u64) -> Result<FeatureVector, PredictionError> {
        if !self.catalog.is_enabled() {
            return Err(Self::unavailable(app_id, ItadError::Disabled));
        }

        let itad_id = self
            .catalog
            .lookup_appid(app_id)
            .await
            .map_err(|e| Self::unavailable(app_id, e))?
            .ok_or(PredictionError::NotFound { app_id })?;
        debug!("Steam app {} maps to ITAD game {}", app_id, itad_id);

        let mut info = self
            .catalog
            .game_info(&itad_id)
            .await
            .map_err(|e| Self::unavailable(app_id, e))?
            .ok_or(PredictionError::NotFound { app_id })?;
        info.appid.get_or_insert(app_id);

        Ok(self.builder.build(app_id, &info))
    }

    fn name(&self) -> &str {
        "itad"
    }
}
