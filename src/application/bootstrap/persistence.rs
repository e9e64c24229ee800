use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::ports::{FeatureSource, GameCatalog};
use crate::infrastructure::persistence::Database;
use crate::infrastructure::{
    FallbackFeatureSource, ItadFeatureSource, JsonFeatureStore, SqliteFeatureStore,
};

pub struct FeatureSourceHandle {
    /// Kept so the pool outlives the store built on it
    pub db: Option<Database>,
    pub source: Arc<dyn FeatureSource>,
}

pub struct FeatureSourceBootstrap;

impl FeatureSourceBootstrap {
    /// Chains the configured stores in precedence order: SQLite warehouse,
    /// JSON snapshot, then live ITAD metadata when enabled.
    pub async fn init(
        config: &Config,
        catalog: Option<Arc<dyn GameCatalog>>,
    ) -> Result<FeatureSourceHandle> {
        let mut chain: Vec<Arc<dyn FeatureSource>> = Vec::new();
        let mut db = None;

        if let Some(db_url) = &config.feature_store.database_url {
            info!("Initializing feature warehouse at {}", db_url);
            let database = Database::new(db_url)
                .await
                .context("Failed to initialize feature database")?;
            chain.push(Arc::new(SqliteFeatureStore::new(database.pool.clone())));
            db = Some(database);
        }

        if let Some(path) = &config.feature_store.json_path {
            let store = JsonFeatureStore::load(path)?;
            if store.is_empty() {
                warn!("Feature snapshot {} contains no games", path.display());
            }
            chain.push(Arc::new(store));
        }

        let catalog = catalog.filter(|c| c.is_enabled());
        match catalog {
            Some(catalog) if chain.is_empty() || config.feature_store.itad_fallback => {
                chain.push(Arc::new(ItadFeatureSource::new(catalog)));
            }
            None if config.feature_store.itad_fallback => {
                warn!("FEATURE_ITAD_FALLBACK is set but ITAD_API_KEY is missing; fallback disabled");
            }
            _ => {}
        }

        let Some(source) = chain
            .into_iter()
            .reduce(|primary, secondary| Arc::new(FallbackFeatureSource::new(primary, secondary)))
        else {
            bail!("No feature source configured: set FEATURE_DB_URL, FEATURE_JSON_PATH or ITAD_API_KEY");
        };

        info!("Feature source: {}", source.name());
        Ok(FeatureSourceHandle { db, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItadEnvConfig;
    use crate::infrastructure::ItadClient;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let mut all = vec![
            ("MODEL_30D_PATH", "m30.onnx"),
            ("MODEL_60D_PATH", "m60.onnx"),
            ("FEATURES_PATH", "features.json"),
        ];
        all.extend_from_slice(pairs);
        let lookup = crate::config::map_lookup(&all);
        Config::from_lookup(&lookup).unwrap()
    }

    fn enabled_catalog() -> Option<Arc<dyn GameCatalog>> {
        Some(Arc::new(ItadClient::new(&ItadEnvConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        })))
    }

    #[tokio::test]
    async fn test_nothing_configured_is_an_error() {
        let result = FeatureSourceBootstrap::init(&config(&[]), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_itad_alone_when_no_store() {
        let handle = FeatureSourceBootstrap::init(&config(&[]), enabled_catalog())
            .await
            .unwrap();
        assert_eq!(handle.source.name(), "itad");
        assert!(handle.db.is_none());
    }

    #[tokio::test]
    async fn test_sqlite_with_itad_fallback() {
        let cfg = config(&[
            ("FEATURE_DB_URL", "sqlite::memory:"),
            ("FEATURE_ITAD_FALLBACK", "true"),
        ]);
        let handle = FeatureSourceBootstrap::init(&cfg, enabled_catalog())
            .await
            .unwrap();
        assert_eq!(handle.source.name(), "sqlite+itad");
    }

    #[tokio::test]
    async fn test_store_without_fallback_ignores_catalog() {
        let cfg = config(&[("FEATURE_DB_URL", "sqlite::memory:")]);
        let handle = FeatureSourceBootstrap::init(&cfg, enabled_catalog())
            .await
            .unwrap();
        assert_eq!(handle.source.name(), "sqlite");
    }
}
