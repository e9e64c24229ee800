use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ports::FeatureSource;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Consults `secondary` only when `primary` has never heard of the game.
/// Every other outcome of `primary`, errors included, is final.
pub struct FallbackFeatureSource {
    primary: Arc<dyn FeatureSource>,
    secondary: Arc<dyn FeatureSource>,
    name: String,
}

impl FallbackFeatureSource {
    pub fn new(primary: Arc<dyn FeatureSource>, secondary: Arc<dyn FeatureSource>) -> Self {
        let name = format!("{}+{}", primary.name(), secondary.name());
        Self {
            primary,
            secondary,
            name,
        }
    }
}

#[async_trait]
impl FeatureSource for FallbackFeatureSource {
    async fn resolve(&self, app_id: u64) -> Result<FeatureVector, PredictionError> {
        match self.primary.resolve(app_id).await {
            Err(PredictionError::NotFound { .. }) => {
                info!(
                    "{} has no entry for {}, trying {}",
                    self.primary.name(),
                    app_id,
                    self.secondary.name()
                );
                self.secondary.resolve(app_id).await
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
