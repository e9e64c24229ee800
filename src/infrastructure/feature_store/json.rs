use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ports::FeatureSource;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Read-only feature snapshot: `{ "<app_id>": { "<feature>": value } }`.
#[derive(Debug, Default)]
pub struct JsonFeatureStore {
    games: HashMap<u64, FeatureVector>,
}

impl JsonFeatureStore {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read feature snapshot {}", path.display()))?;
        let store = Self::from_json_str(&raw)
            .with_context(|| format!("Invalid feature snapshot {}", path.display()))?;
        info!(
            "Loaded feature snapshot for {} games from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(raw)?;

        let mut games = HashMap::with_capacity(parsed.len());
        for (key, features) in parsed {
            let app_id: u64 = key
                .trim()
                .parse()
                .map_err(|_| anyhow!("'{}' is not a valid app id", key))?;
            // Empty entries stay resolvable and surface as missing features later.
            let vector = if features.is_empty() {
                FeatureVector::default()
            } else {
                FeatureVector::from_json(&features)
                    .map_err(|e| anyhow!("app {}: {}", app_id, e))?
            };
            games.insert(app_id, vector);
        }

        Ok(Self { games })
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[async_trait]
impl FeatureSource for JsonFeatureStore {
    async fn resolve(&self, app_id: u64) -> Result<FeatureVector, PredictionError> {
        self.games
            .get(&app_id)
            .cloned()
            .ok_or(PredictionError::NotFound { app_id })
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_known_games() {
        let store = JsonFeatureStore::from_json_str(
            r#"{"480": {"log_launch_price": 4.09, "mature": false}, "10": {}}"#,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        let fv = store.resolve(480).await.unwrap();
        assert_eq!(fv.get("mature"), Some(0.0));
        assert!(store.resolve(10).await.unwrap().is_empty());
        assert_eq!(
            store.resolve(11).await.unwrap_err(),
            PredictionError::NotFound { app_id: 11 }
        );
    }

    #[test]
    fn test_rejects_bad_keys_and_values() {
        assert!(JsonFeatureStore::from_json_str(r#"{"abc": {"x": 1}}"#).is_err());
        assert!(JsonFeatureStore::from_json_str(r#"{"1": {"x": [1]}}"#).is_err());
    }
}
