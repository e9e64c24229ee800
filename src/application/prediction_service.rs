//! Two-horizon discount prediction over a shared, read-only model set.
//!
//! Every call is stateless: the only await point is the feature lookup, and
//! the loaded models are never mutated, so concurrent requests need no locks.

use crate::application::ml::ModelSet;
use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_registry::{FeatureOrigin, FeatureVector};
use crate::domain::ports::FeatureSource;
use crate::domain::prediction::{
    DecisionPolicy, Horizon, HorizonPrediction, PredictionResult, sanitize_probability,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_CLASSIFICATION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub model_30d_loaded: bool,
    pub model_60d_loaded: bool,
    pub model_30d_version: String,
    pub model_60d_version: String,
    pub feature_source: String,
}

pub struct PredictionService {
    models: ModelSet,
    features: Arc<dyn FeatureSource>,
    policy: DecisionPolicy,
    default_threshold: f64,
}

impl PredictionService {
    pub fn new(models: ModelSet, features: Arc<dyn FeatureSource>, policy: DecisionPolicy) -> Self {
        Self {
            models,
            features,
            policy,
            default_threshold: DEFAULT_CLASSIFICATION_THRESHOLD,
        }
    }

    pub fn with_default_threshold(mut self, threshold: f64) -> Self {
        self.default_threshold = threshold;
        self
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    /// Predicts both horizons for a game known to the feature source.
    pub async fn predict(&self, app_id: u64) -> Result<PredictionResult, PredictionError> {
        if app_id == 0 {
            return Err(PredictionError::validation("app_id must be a positive integer"));
        }

        let features = self.features.resolve(app_id).await.map_err(|e| {
            warn!(
                "Feature lookup via {} failed for {}: {}",
                self.features.name(),
                app_id,
                e
            );
            e
        })?;
        debug!("Resolved {} features for {}", features.len(), app_id);

        self.predict_with_origin(app_id, &features, FeatureOrigin::Upstream { app_id })
    }

    /// Predicts both horizons from features the `FeatureBuilder` produced.
    pub fn predict_features(
        &self,
        appid: u64,
        features: &FeatureVector,
    ) -> Result<PredictionResult, PredictionError> {
        self.predict_with_origin(appid, features, FeatureOrigin::Built { app_id: appid })
    }

    /// Single-horizon prediction over a caller-supplied mapping, with an
    /// optional classification cutoff.
    pub fn predict_horizon(
        &self,
        appid: u64,
        horizon: Horizon,
        features: &FeatureVector,
        threshold: Option<f64>,
    ) -> Result<HorizonPrediction, PredictionError> {
        self.horizon_with_origin(appid, horizon, features, threshold, FeatureOrigin::Request)
    }

    /// Single-horizon prediction over builder output.
    pub fn predict_built_horizon(
        &self,
        appid: u64,
        horizon: Horizon,
        features: &FeatureVector,
        threshold: Option<f64>,
    ) -> Result<HorizonPrediction, PredictionError> {
        let origin = FeatureOrigin::Built { app_id: appid };
        self.horizon_with_origin(appid, horizon, features, threshold, origin)
    }

    fn horizon_with_origin(
        &self,
        appid: u64,
        horizon: Horizon,
        features: &FeatureVector,
        threshold: Option<f64>,
        origin: FeatureOrigin,
    ) -> Result<HorizonPrediction, PredictionError> {
        let threshold = match threshold {
            Some(t) if (0.0..=1.0).contains(&t) => t,
            Some(t) => {
                return Err(PredictionError::validation(format!(
                    "threshold must lie in [0, 1], got {}",
                    t
                )));
            }
            None => self.default_threshold,
        };

        let input = features.to_vector(self.models.feature_names(), origin)?;
        let score = self.score(horizon, &input)?;
        let will_discount = score >= threshold;

        info!(
            appid,
            horizon = %horizon,
            score,
            threshold,
            will_discount,
            "Prediction made"
        );

        Ok(HorizonPrediction {
            appid,
            horizon,
            will_discount,
            score,
            threshold,
        })
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            model_30d_loaded: true,
            model_60d_loaded: true,
            model_30d_version: self.models.model(Horizon::Days30).version().to_string(),
            model_60d_version: self.models.model(Horizon::Days60).version().to_string(),
            feature_source: self.features.name().to_string(),
        }
    }

    fn predict_with_origin(
        &self,
        appid: u64,
        features: &FeatureVector,
        origin: FeatureOrigin,
    ) -> Result<PredictionResult, PredictionError> {
        let input = features.to_vector(self.models.feature_names(), origin)?;

        let probability_30d = self.score(Horizon::Days30, &input)?;
        let probability_60d = self.score(Horizon::Days60, &input)?;
        let decision = self.policy.decide(probability_30d, probability_60d);

        info!(
            appid,
            prob_30d = probability_30d,
            prob_60d = probability_60d,
            decision = %decision,
            "Prediction made"
        );

        Ok(PredictionResult {
            probability_30d,
            probability_60d,
            decision,
        })
    }

    fn score(&self, horizon: Horizon, input: &[f64]) -> Result<f64, PredictionError> {
        let model = self.models.model(horizon);
        let raw = model.predict_proba(input).map_err(|e| PredictionError::Internal {
            reason: format!("{} model {} failed: {}", horizon, model.version(), e),
        })?;
        sanitize_probability(raw)
    }
}
