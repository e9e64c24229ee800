use super::predictor::DiscountModel;
use super::onnx_model::OnnxDiscountModel;
use crate::config::ModelEnvConfig;
use crate::domain::errors::PredictionError;
use crate::domain::prediction::Horizon;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The pair of horizon models plus the feature order they share.
///
/// Loaded once at startup and shared read-only across requests.
#[derive(Clone)]
pub struct ModelSet {
    model_30d: Arc<dyn DiscountModel>,
    model_60d: Arc<dyn DiscountModel>,
    feature_names: Arc<[String]>,
}

impl ModelSet {
    /// Pairs two models, checking both were trained on `feature_names`.
    pub fn new(
        model_30d: Arc<dyn DiscountModel>,
        model_60d: Arc<dyn DiscountModel>,
        feature_names: Vec<String>,
    ) -> Result<Self, PredictionError> {
        for (horizon, model) in [(Horizon::Days30, &model_30d), (Horizon::Days60, &model_60d)] {
            if model.feature_names() != feature_names.as_slice() {
                return Err(PredictionError::model_unavailable(format!(
                    "{} model ({}) was trained on a different feature list",
                    horizon,
                    model.version()
                )));
            }
        }

        Ok(Self {
            model_30d,
            model_60d,
            feature_names: feature_names.into(),
        })
    }

    /// Loads the feature list and both artifacts named by `config`.
    pub fn load(config: &ModelEnvConfig) -> Result<Self, PredictionError> {
        info!("Loading model artifacts...");

        let feature_names = load_feature_list(&config.features_path)?;
        let model_30d = OnnxDiscountModel::load(&config.model_30d_path, feature_names.clone())?;
        let model_60d = OnnxDiscountModel::load(&config.model_60d_path, feature_names.clone())?;

        let set = Self::new(Arc::new(model_30d), Arc::new(model_60d), feature_names)?;
        info!(
            "Model artifacts loaded: 30d={} 60d={} features={}",
            set.model_30d.version(),
            set.model_60d.version(),
            set.feature_names.len()
        );
        Ok(set)
    }

    pub fn model(&self, horizon: Horizon) -> &dyn DiscountModel {
        match horizon {
            Horizon::Days30 => self.model_30d.as_ref(),
            Horizon::Days60 => self.model_60d.as_ref(),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

/// Reads the JSON array of feature names the models were trained on.
pub fn load_feature_list(path: &Path) -> Result<Vec<String>, PredictionError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        PredictionError::model_unavailable(format!(
            "features list not readable at {}: {}",
            path.display(),
            e
        ))
    })?;

    let names: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
        PredictionError::model_unavailable(format!(
            "features list at {} is not a JSON array of strings: {}",
            path.display(),
            e
        ))
    })?;

    if names.is_empty() {
        return Err(PredictionError::model_unavailable(format!(
            "features list at {} is empty",
            path.display()
        )));
    }
    Ok(names)
}
