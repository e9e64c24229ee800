#![allow(dead_code)]

use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use waitforit::application::ml::{DiscountModel, ModelSet};
use waitforit::application::prediction_service::PredictionService;
use waitforit::domain::ml::FEATURE_NAMES;
use waitforit::domain::ml::feature_registry::default_feature_names;
use waitforit::domain::ports::FeatureSource;
use waitforit::domain::prediction::DecisionPolicy;

/// One split on `is_holiday_season`: holiday launches score
/// sigmoid(base + 2), everything else sigmoid(base - 2).
pub struct HolidayModel {
    names: Vec<String>,
    holiday: usize,
    base_score: f64,
    version: String,
}

impl DiscountModel for HolidayModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String> {
        let value = features.get(self.holiday).ok_or("missing holiday flag")?;
        let margin = if *value > 0.5 { 2.0 } else { -2.0 };
        Ok(1.0 / (1.0 + (-(self.base_score + margin)).exp()))
    }
    fn feature_names(&self) -> &[String] {
        &self.names
    }
    fn name(&self) -> &str {
        "holiday"
    }
    fn version(&self) -> &str {
        &self.version
    }
}

pub fn holiday_model(version: &str, base_score: f64) -> HolidayModel {
    let holiday = FEATURE_NAMES
        .iter()
        .position(|name| *name == "is_holiday_season")
        .unwrap();

    HolidayModel {
        names: default_feature_names(),
        holiday,
        base_score,
        version: version.to_string(),
    }
}

pub fn model_set() -> ModelSet {
    ModelSet::new(
        Arc::new(holiday_model("test-30d", 0.0)),
        Arc::new(holiday_model("test-60d", 0.5)),
        default_feature_names(),
    )
    .unwrap()
}

pub fn prediction_service(source: Arc<dyn FeatureSource>) -> PredictionService {
    PredictionService::new(model_set(), source, DecisionPolicy::default())
}

/// Every registry feature set to 0, except the holiday flag.
pub fn full_features(holiday: bool) -> serde_json::Map<String, serde_json::Value> {
    FEATURE_NAMES
        .iter()
        .map(|name| {
            let value = if *name == "is_holiday_season" && holiday { 1.0 } else { 0.0 };
            (name.to_string(), json!(value))
        })
        .collect()
}

pub fn temp_path(file: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("waitforit-test-{}", uuid::Uuid::new_v4()))
        .join(file)
}
