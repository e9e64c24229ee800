use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ports::FeatureSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Feature warehouse backed by the `games` / `game_features` tables.
pub struct SqliteFeatureStore {
    pool: SqlitePool,
}

impl SqliteFeatureStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Writes a game and its feature rows, replacing earlier values.
    /// `None` values are stored as NULL.
    pub async fn upsert_game(
        &self,
        app_id: u64,
        name: &str,
        features: &[(&str, Option<f64>)],
    ) -> Result<()> {
        let id = i64::try_from(app_id).context("app_id out of range")?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO games (app_id, name)
            VALUES (?, ?)
            ON CONFLICT(app_id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(id)
        .bind(name)
        .execute(&mut *tx)
        .await
        .context("Failed to save game")?;

        for (feature, value) in features {
            sqlx::query(
                r#"
                INSERT INTO game_features (app_id, feature, value)
                VALUES (?, ?, ?)
                ON CONFLICT(app_id, feature) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(id)
            .bind(*feature)
            .bind(*value)
            .execute(&mut *tx)
            .await
            .context("Failed to save game feature")?;
        }

        tx.commit().await?;
        info!("Persisted {} features for game {}", features.len(), app_id);
        Ok(())
    }
}

#[async_trait]
impl FeatureSource for SqliteFeatureStore {
    async fn resolve(&self, app_id: u64) -> Result<FeatureVector, PredictionError> {
        let id = i64::try_from(app_id).map_err(|_| PredictionError::NotFound { app_id })?;
        let query_failed =
            |e: sqlx::Error| PredictionError::data_unavailable(app_id, format!("warehouse query failed: {}", e));

        let game = sqlx::query("SELECT app_id FROM games WHERE app_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)?;
        if game.is_none() {
            return Err(PredictionError::NotFound { app_id });
        }

        let rows = sqlx::query(
            "SELECT feature, value FROM game_features WHERE app_id = ? ORDER BY feature",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        if rows.is_empty() {
            return Err(PredictionError::data_unavailable(
                app_id,
                "no features recorded",
            ));
        }

        let mut values = BTreeMap::new();
        for row in rows {
            let feature: String = row.try_get("feature").map_err(query_failed)?;
            let value: Option<f64> = row.try_get("value").map_err(query_failed)?;
            match value {
                Some(v) => {
                    values.insert(feature, v);
                }
                None => {
                    return Err(PredictionError::data_unavailable(
                        app_id,
                        format!("feature '{}' is NULL", feature),
                    ));
                }
            }
        }

        debug!("Loaded {} warehouse features for {}", values.len(), app_id);
        Ok(FeatureVector::new(values))
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
