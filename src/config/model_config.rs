//! Model artifact locations.

use super::Lookup;
use anyhow::{Result, anyhow};
use std::path::PathBuf;

/// Model artifact environment configuration. All three paths are required.
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_30d_path: PathBuf,
    pub model_60d_path: PathBuf,
    pub features_path: PathBuf,
}

impl ModelEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("{} must be set", key))
        };

        Ok(Self {
            model_30d_path: required("MODEL_30D_PATH")?,
            model_60d_path: required("MODEL_60D_PATH")?,
            features_path: required("FEATURES_PATH")?,
        })
    }
}
