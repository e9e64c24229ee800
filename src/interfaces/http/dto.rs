use crate::application::insights::HorizonInsights;
use crate::domain::errors::PredictionError;
use crate::domain::prediction::{Horizon, HorizonPrediction};
use serde::{Deserialize, Serialize};

// =============================================================================
// Request/Response types
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HorizonRequest {
    pub appid: u64,
    pub horizon: String,
    pub features: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonResponse {
    pub appid: u64,
    pub horizon: Horizon,
    pub will_discount: bool,
    pub score: f64,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<HorizonInsights>,
}

impl HorizonResponse {
    pub fn new(prediction: HorizonPrediction, insights: Option<HorizonInsights>) -> Self {
        Self {
            appid: prediction.appid,
            horizon: prediction.horizon,
            will_discount: prediction.will_discount,
            score: prediction.score,
            threshold: prediction.threshold,
            insights,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItadPredictRequest {
    pub itad_id: String,
    pub horizon: String,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub include_insights: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItadPredictResponse {
    #[serde(flatten)]
    pub prediction: HorizonResponse,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InsightsQuery {
    #[serde(default)]
    pub include_insights: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn title(&self) -> Result<&str, PredictionError> {
        self.title
            .as_deref()
            .ok_or_else(|| PredictionError::validation("title query parameter is required"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

/// Extracts `app_id` from a `POST /predict` body.
///
/// Only a positive JSON integer is accepted: strings, floats with a
/// fractional part, zero and negatives are all validation errors.
pub fn parse_app_id(body: &serde_json::Value) -> Result<u64, PredictionError> {
    let raw = body
        .as_object()
        .ok_or_else(|| PredictionError::validation("request body must be a JSON object"))?
        .get("app_id")
        .ok_or_else(|| PredictionError::validation("app_id is required"))?;

    let number = match raw {
        serde_json::Value::Number(n) => n,
        other => {
            return Err(PredictionError::validation(format!(
                "app_id must be a positive integer, got {}",
                other
            )));
        }
    };

    let app_id = match (number.as_u64(), number.as_f64()) {
        (Some(id), _) => id,
        // 480.0 is still an integer
        (None, Some(f)) if f.fract() == 0.0 && f > 0.0 && f <= u64::MAX as f64 => f as u64,
        _ => {
            return Err(PredictionError::validation(format!(
                "app_id must be a positive integer, got {}",
                number
            )));
        }
    };

    if app_id == 0 {
        return Err(PredictionError::validation("app_id must be a positive integer"));
    }
    Ok(app_id)
}

pub fn parse_horizon(raw: &str) -> Result<Horizon, PredictionError> {
    raw.trim().parse()
}
