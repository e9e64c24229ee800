use super::predictor::DiscountModel;
use crate::domain::errors::PredictionError;
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info};

/// Binary discount classifier exported to ONNX.
///
/// Expects a single float input of shape `[batch, n_features]` and a float
/// probability output of shape `[batch, 2]` (LightGBM / scikit-learn exports
/// with the zipmap disabled). A `[batch, 1]` output is read as the
/// positive-class probability directly.
pub struct OnnxDiscountModel {
    session: Mutex<Session>,
    feature_names: Vec<String>,
    version: String,
}

impl OnnxDiscountModel {
    /// The ONNX graph carries no feature names, so the caller supplies the
    /// list the model was trained on.
    pub fn load(path: &Path, feature_names: Vec<String>) -> Result<Self, PredictionError> {
        if !path.exists() {
            return Err(PredictionError::model_unavailable(format!(
                "model artifact not found at {}",
                path.display()
            )));
        }

        let session = match Session::builder() {
            Ok(mut builder) => match builder.commit_from_file(path) {
                Ok(session) => session,
                Err(e) => {
                    error!("Failed to load ONNX model {}: {}", path.display(), e);
                    return Err(PredictionError::model_unavailable(format!(
                        "model artifact at {} is not a loadable ONNX graph: {}",
                        path.display(),
                        e
                    )));
                }
            },
            Err(e) => {
                error!("Failed to create ONNX session builder: {}", e);
                return Err(PredictionError::model_unavailable(format!(
                    "ONNX runtime unavailable: {}",
                    e
                )));
            }
        };

        let version = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());
        info!(
            "Loaded ONNX model {} from {} ({} features)",
            version,
            path.display(),
            feature_names.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            feature_names,
            version,
        })
    }
}

impl DiscountModel for OnnxDiscountModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String> {
        if features.len() != self.feature_names.len() {
            return Err(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                features.len()
            ));
        }

        let input: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let shape = vec![1, input.len()];
        let input_value = ort::value::Value::from_array((shape.as_slice(), input))
            .map_err(|e| format!("Input value creation failed: {}", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Mutex lock failed: {}", e))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| e.to_string())?;

        // The label output is int64; the first float tensor holds the probabilities
        for (_, value) in outputs.iter() {
            if let Ok((_, data)) = value.try_extract_tensor::<f32>() {
                let p = match data {
                    [_, positive, ..] => *positive,
                    [single] => *single,
                    [] => return Err("Empty output".to_string()),
                };
                return Ok(p as f64);
            }
        }
        Err("No float probability output found".to_string())
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn name(&self) -> &str {
        "ONNX Runtime"
    }

    fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn test_missing_artifact_is_model_unavailable() {
        let err = OnnxDiscountModel::load(Path::new("nowhere/model_30d.onnx"), names())
            .err()
            .unwrap();
        assert!(matches!(err, PredictionError::ModelUnavailable { .. }));
        assert!(err.to_string().contains("nowhere/model_30d.onnx"));
    }

    #[test]
    fn test_corrupt_artifact_is_model_unavailable() {
        let dir = std::env::temp_dir().join(format!("waitforit-onnx-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model_60d.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let err = OnnxDiscountModel::load(&path, names()).err().unwrap();
        assert!(matches!(err, PredictionError::ModelUnavailable { .. }));

        std::fs::remove_dir_all(dir).ok();
    }
}
