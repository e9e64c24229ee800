//! REST API for WaitForIt
//!
//! All handlers are stateless over a shared, read-only [`AppState`].

use super::dto::{
    HorizonRequest, HorizonResponse, InsightsQuery, ItadPredictRequest, ItadPredictResponse,
    SearchQuery, parse_app_id, parse_horizon,
};
use super::rejection::{error_response, handle_rejection, prediction_error_response};
use crate::application::insights::InsightService;
use crate::application::prediction_service::PredictionService;
use crate::application::search::TitleSearchService;
use crate::application::upcoming::{UpcomingError, load_upcoming};
use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::infrastructure::observability::Metrics;
use serde::Serialize;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use warp::http::StatusCode;
use warp::{Filter, Reply};

const MAX_BODY_BYTES: u64 = 64 * 1024;
const DEFAULT_SUGGESTIONS: usize = 8;
const MAX_SUGGESTIONS: usize = 25;

#[derive(Clone)]
pub struct AppState {
    pub predictions: Arc<PredictionService>,
    pub search: Arc<TitleSearchService>,
    pub insights: InsightService,
    pub metrics: Option<Metrics>,
    pub upcoming_path: PathBuf,
}

impl AppState {
    fn error_reply(&self, err: &PredictionError) -> warp::reply::Response {
        if let Some(metrics) = &self.metrics {
            metrics.inc_error(err.kind());
        }
        prediction_error_response(err)
    }

    fn observe(&self, route: &str, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.observe_latency(route, started.elapsed().as_secs_f64());
        }
    }

    fn count_decision(&self, label: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_prediction(label);
        }
    }
}

// =============================================================================
// API Routes
// =============================================================================

/// Build the complete API route tree
pub fn api_routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let predict = warp::path!("predict")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_predict);

    let predict_horizon = warp::path!("predict" / "horizon")
        .and(warp::post())
        .and(warp::query::<InsightsQuery>())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_predict_horizon);

    let predict_from_itad = warp::path!("predict" / "from_itad")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_predict_from_itad);

    let predict_search = warp::path!("predict" / "search")
        .and(warp::get())
        .and(warp::query::<SearchQuery>())
        .and(with_state(state.clone()))
        .and_then(handle_predict_search);

    let games_search = warp::path!("games" / "search")
        .and(warp::get())
        .and(warp::query::<SearchQuery>())
        .and(with_state(state.clone()))
        .and_then(handle_games_search);

    let upcoming = warp::path!("games" / "upcoming")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_upcoming);

    let health = warp::path!("health")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_health);

    let metrics = warp::path!("metrics")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handle_metrics);

    predict
        .or(predict_horizon)
        .or(predict_from_itad)
        .or(predict_search)
        .or(games_search)
        .or(upcoming)
        .or(health)
        .or(metrics)
        .recover(handle_rejection)
}

/// Request completion log line, attached with `warp::log::custom`.
pub fn log_request(info: warp::log::Info<'_>) {
    info!(
        method = %info.method(),
        path = info.path(),
        status_code = info.status().as_u16(),
        duration_ms = info.elapsed().as_secs_f64() * 1000.0,
        "Request completed"
    );
}

// =============================================================================
// Filters
// =============================================================================

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

// =============================================================================
// Handlers
// =============================================================================

async fn handle_predict(
    body: serde_json::Value,
    state: AppState,
) -> Result<warp::reply::Response, Infallible> {
    let started = Instant::now();

    let outcome = match parse_app_id(&body) {
        Ok(app_id) => state.predictions.predict(app_id).await,
        Err(e) => Err(e),
    };
    let response = match outcome {
        Ok(result) => {
            state.count_decision(result.decision.label());
            json_response(&result)
        }
        Err(e) => state.error_reply(&e),
    };

    state.observe("predict", started);
    Ok(response)
}

async fn handle_predict_horizon(
    query: InsightsQuery,
    body: HorizonRequest,
    state: AppState,
) -> Result<warp::reply::Response, Infallible> {
    let started = Instant::now();

    let outcome = predict_horizon(&state, &query, &body);

    let response = match outcome {
        Ok(result) => json_response(&result),
        Err(e) => state.error_reply(&e),
    };

    state.observe("predict_horizon", started);
    Ok(response)
}

fn predict_horizon(
    state: &AppState,
    query: &InsightsQuery,
    body: &HorizonRequest,
) -> Result<HorizonResponse, PredictionError> {
    let horizon = parse_horizon(&body.horizon)?;
    let features = FeatureVector::from_json(&body.features)?;
    let prediction = state
        .predictions
        .predict_horizon(body.appid, horizon, &features, body.threshold)?;
    let insights = query
        .include_insights
        .then(|| state.insights.horizon_insights(&prediction, &features));
    Ok(HorizonResponse::new(prediction, insights))
}

async fn handle_predict_from_itad(
    body: ItadPredictRequest,
    state: AppState,
) -> Result<warp::reply::Response, Infallible> {
    let started = Instant::now();

    let outcome = match parse_horizon(&body.horizon) {
        Ok(horizon) => {
            state
                .search
                .predict_from_itad(&body.itad_id, horizon, body.threshold)
                .await
        }
        Err(e) => Err(e),
    };
    let response = match outcome {
        Ok(hit) => {
            let insights = body
                .include_insights
                .then(|| state.insights.horizon_insights(&hit.prediction, &hit.features));
            json_response(&ItadPredictResponse {
                prediction: HorizonResponse::new(hit.prediction, insights),
                name: hit.name,
                image_url: hit.image_url,
            })
        }
        Err(e) => state.error_reply(&e),
    };

    state.observe("predict_from_itad", started);
    Ok(response)
}

async fn handle_predict_search(
    query: SearchQuery,
    state: AppState,
) -> Result<warp::reply::Response, Infallible> {
    let started = Instant::now();

    let outcome = match query.title() {
        Ok(title) => state.search.predict_by_title(title).await,
        Err(e) => Err(e),
    };
    let response = match outcome {
        Ok(result) => {
            state.count_decision(result.insights.decision.label());
            json_response(&result)
        }
        Err(e) => state.error_reply(&e),
    };

    state.observe("predict_search", started);
    Ok(response)
}

async fn handle_games_search(
    query: SearchQuery,
    state: AppState,
) -> Result<warp::reply::Response, Infallible> {
    let started = Instant::now();
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SUGGESTIONS)
        .clamp(1, MAX_SUGGESTIONS);

    let outcome = match query.title() {
        Ok(title) => state.search.suggest(title, limit).await,
        Err(e) => Err(e),
    };
    let response = match outcome {
        Ok(hits) => json_response(&hits),
        Err(e) => state.error_reply(&e),
    };

    state.observe("games_search", started);
    Ok(response)
}

async fn handle_upcoming(state: AppState) -> Result<warp::reply::Response, Infallible> {
    let started = Instant::now();

    let response = match load_upcoming(&state.upcoming_path).await {
        Ok(games) => json_response(&games),
        Err(e @ UpcomingError::NotGenerated) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "not_generated", &e.to_string())
        }
        Err(e @ UpcomingError::Invalid(_)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            &e.to_string(),
        ),
    };

    state.observe("games_upcoming", started);
    Ok(response)
}

async fn handle_health(state: AppState) -> Result<warp::reply::Response, Infallible> {
    Ok(json_response(&state.predictions.health()))
}

async fn handle_metrics(state: AppState) -> Result<warp::reply::Response, Infallible> {
    match &state.metrics {
        Some(metrics) => Ok(warp::reply::with_header(
            metrics.render(),
            "content-type",
            "text/plain; version=0.0.4",
        )
        .into_response()),
        None => Ok(error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "Metrics are disabled",
        )),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn json_response<T: Serialize>(body: &T) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK).into_response()
}
