use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::errors::PredictionError;

/// Ordered list of feature names.
/// This order MUST match the feature list the discount models were trained with.
/// Any change here is a breaking change for model artifacts.
pub const FEATURE_NAMES: &[&str] = &[
    "log_launch_price",
    "publisher_size_log",
    "release_year",
    "release_quarter",
    "release_month",
    "release_weekday",
    "is_holiday_season",
    "is_summer_sale_window",
    "early_access",
    "mature",
    "Achievements",
    "is_multiplatform_refined",
    "exclusive_steam",
    "is_multi_store_pc",
    "is_cross_platform",
    "genre_cluster_strategy_sim",
    "genre_cluster_mmo",
    "is_autumn_sale_window",
    "within_7d_of_steam_sale",
    "franchise_count_prev",
    "developer_size_log",
    "publisher_size_bin__Small (≤5)",
    "publisher_size_bin__Medium (6–15)",
    "publisher_size_bin__Large (16–50)",
    "publisher_size_bin__Major (>50)",
    "developer_size_bin__Solo/Indie (≤2)",
    "developer_size_bin__Small (3–5)",
    "developer_size_bin__Mid (6–15)",
    "developer_size_bin__Large (>15)",
    "price_x_multiplatform",
    "publisher_x_multiplatform",
    "developer_x_multiplatform",
    "price_x_pubsize",
    "price_x_devsize",
];

/// Where a feature vector came from. Decides how a gap in it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOrigin {
    /// Supplied by the API caller: gaps are the caller's fault.
    Request,
    /// Resolved from the warehouse or an upstream API for `app_id`.
    Upstream { app_id: u64 },
    /// Built server-side from catalog metadata: a gap is our own bug.
    Built { app_id: u64 },
}

impl FeatureOrigin {
    fn gap(&self, reason: String) -> PredictionError {
        match self {
            Self::Request => PredictionError::Validation { reason },
            Self::Upstream { app_id } => PredictionError::DataUnavailable {
                app_id: *app_id,
                reason,
            },
            Self::Built { app_id } => PredictionError::Internal {
                reason: format!("feature builder output for {} is incomplete: {}", app_id, reason),
            },
        }
    }
}

/// Immutable mapping from feature name to numeric value for one game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    pub fn new(values: BTreeMap<String, f64>) -> Self {
        Self(values)
    }

    /// Parse a caller-supplied JSON object.
    ///
    /// Numbers, booleans and numeric strings are accepted; `null` entries are
    /// dropped so they surface as missing during vectorization.
    pub fn from_json(
        raw: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, PredictionError> {
        if raw.is_empty() {
            return Err(PredictionError::validation("features cannot be empty"));
        }

        let mut values = BTreeMap::new();
        for (name, value) in raw {
            let numeric = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match numeric {
                Some(v) => {
                    values.insert(name.clone(), v);
                }
                None => {
                    return Err(PredictionError::validation(format!(
                        "Feature '{}' must be numeric. Got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(Self(values))
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Orders the values by `feature_names`, failing on any gap.
    pub fn to_vector(
        &self,
        feature_names: &[String],
        origin: FeatureOrigin,
    ) -> Result<Vec<f64>, PredictionError> {
        let mut vector = Vec::with_capacity(feature_names.len());
        let mut missing = Vec::new();

        for name in feature_names {
            match self.0.get(name) {
                Some(v) if v.is_finite() => vector.push(*v),
                Some(v) => {
                    return Err(origin.gap(format!("Feature '{}' must be finite. Got {}", name, v)));
                }
                None => missing.push(name.as_str()),
            }
        }

        if !missing.is_empty() {
            return Err(origin.gap(format!("Missing required features: {:?}", missing)));
        }

        Ok(vector)
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Owned copy of [`FEATURE_NAMES`], the default model input order.
pub fn default_feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}
