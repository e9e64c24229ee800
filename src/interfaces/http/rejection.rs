use super::dto::ApiError;
use crate::domain::errors::PredictionError;
use std::convert::Infallible;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

pub fn error_response(status: StatusCode, code: &str, message: &str) -> warp::reply::Response {
    let body = ApiError {
        error: message.to_string(),
        code: code.to_string(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

pub fn status_for(err: &PredictionError) -> StatusCode {
    match err {
        PredictionError::Validation { .. } => StatusCode::BAD_REQUEST,
        PredictionError::NotFound { .. } | PredictionError::TitleNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        PredictionError::DataUnavailable { .. }
        | PredictionError::ModelUnavailable { .. }
        | PredictionError::Disabled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        PredictionError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        PredictionError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Logs the error and renders it as `{"error", "code"}`.
pub fn prediction_error_response(err: &PredictionError) -> warp::reply::Response {
    let status = status_for(err);
    let retryable = err.is_retryable();
    if status.is_server_error() {
        error!(code = err.kind(), status = status.as_u16(), retryable, "{}", err);
    } else {
        warn!(code = err.kind(), status = status.as_u16(), retryable, "{}", err);
    }
    error_response(status, err.kind(), &err.to_string())
}

/// Turns warp's own rejections (unknown route, bad body, bad query) into
/// the same JSON error shape the handlers use.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, code, message): (StatusCode, &str, String) =
        if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
            (
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("Invalid request body: {}", e),
            )
        } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
            (
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("Invalid query parameters: {}", e),
            )
        } else if err.find::<warp::reject::LengthRequired>().is_some() {
            // No Content-Length: empty or chunked body
            (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request body is required".into(),
            )
        } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                "validation_error",
                "Request payload too large".into(),
            )
        } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
            (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "validation_error",
                "Request body must be JSON".into(),
            )
        } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
            (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                "Method not allowed".into(),
            )
        } else if err.is_not_found() {
            (StatusCode::NOT_FOUND, "not_found", "Route not found".into())
        } else {
            error!("Unhandled rejection: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".into(),
            )
        };

    if status.is_client_error() && status != StatusCode::NOT_FOUND {
        warn!(code, status = status.as_u16(), "{}", message);
    }
    Ok(error_response(status, code, &message))
}
