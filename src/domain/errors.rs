use thiserror::Error;

/// Errors surfaced by the prediction path.
///
/// Every variant maps to exactly one HTTP status in the interface layer,
/// see [`PredictionError::kind`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictionError {
    #[error("Invalid request: {reason}")]
    Validation { reason: String },

    #[error("Game not found: {app_id}")]
    NotFound { app_id: u64 },

    #[error("No catalog match found for '{title}'")]
    TitleNotFound { title: String },

    #[error("Feature data unavailable for {app_id}: {reason}")]
    DataUnavailable { app_id: u64, reason: String },

    #[error("Model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("Not configured: {reason}")]
    Disabled { reason: String },

    #[error("Upstream service failed: {reason}")]
    Upstream { reason: String },

    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl PredictionError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn data_unavailable(app_id: u64, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            app_id,
            reason: reason.into(),
        }
    }

    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, used in JSON error bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } | Self::TitleNotFound { .. } => "not_found",
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::ModelUnavailable { .. } => "model_unavailable",
            Self::Disabled { .. } => "not_configured",
            Self::Upstream { .. } => "upstream_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Whether the same request may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. } | Self::Upstream { .. } | Self::ModelUnavailable { .. }
        )
    }
}

/// Errors raised while talking to IsThereAnyDeal.
#[derive(Debug, Error)]
pub enum ItadError {
    #[error("ITAD integration is not configured")]
    Disabled,

    #[error("ITAD request to {path} failed: {reason}")]
    Request { path: String, reason: String },

    #[error("ITAD returned status {status} for {path}: {body_snippet}")]
    Status {
        path: String,
        status: u16,
        body_snippet: String,
    },

    #[error("ITAD response for {path} could not be parsed: {reason}")]
    Decode { path: String, reason: String },
}

impl From<ItadError> for PredictionError {
    fn from(err: ItadError) -> Self {
        PredictionError::Upstream {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_error_formatting() {
        let err = PredictionError::DataUnavailable {
            app_id: 570,
            reason: "feature 'mature' is NULL".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("570"));
        assert!(msg.contains("mature"));
        assert_eq!(err.kind(), "data_unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found_is_terminal() {
        let err = PredictionError::NotFound { app_id: 1 };
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Game not found: 1");
    }

    #[test]
    fn test_itad_status_maps_to_upstream() {
        let err: PredictionError = ItadError::Status {
            path: "/games/info/v2".to_string(),
            status: 500,
            body_snippet: "oops".to_string(),
        }
        .into();

        assert_eq!(err.kind(), "upstream_error");
        assert!(err.to_string().contains("500"));
    }
}
