mod common;

use common::{full_features, prediction_service};
use std::sync::Arc;
use waitforit::domain::errors::PredictionError;
use waitforit::domain::ml::FEATURE_NAMES;
use waitforit::domain::ports::FeatureSource;
use waitforit::domain::prediction::Decision;
use tokio_test::{assert_err, assert_ok};
use waitforit::infrastructure::{Database, FallbackFeatureSource, JsonFeatureStore, SqliteFeatureStore};

async fn store() -> SqliteFeatureStore {
    let db = Database::new("sqlite::memory:").await.unwrap();
    SqliteFeatureStore::new(db.pool.clone())
}

fn all_features(holiday: bool) -> Vec<(&'static str, Option<f64>)> {
    FEATURE_NAMES
        .iter()
        .map(|name| {
            let value = if *name == "is_holiday_season" && holiday { 1.0 } else { 0.0 };
            (*name, Some(value))
        })
        .collect()
}

#[tokio::test]
async fn test_sqlite_resolves_complete_games() {
    let store = store().await;
    assert_ok!(
        store
            .upsert_game(1030300, "Hollow Knight: Silksong", &all_features(true))
            .await
    );

    let fv = assert_ok!(store.resolve(1030300).await);
    assert_eq!(fv.len(), FEATURE_NAMES.len());
    assert_eq!(fv.get("is_holiday_season"), Some(1.0));
}

#[tokio::test]
async fn test_sqlite_unknown_game_is_not_found() {
    let store = store().await;
    assert_eq!(
        store.resolve(42).await.unwrap_err(),
        PredictionError::NotFound { app_id: 42 }
    );
}

#[tokio::test]
async fn test_sqlite_gaps_are_data_unavailable() {
    let store = store().await;

    let mut features = all_features(false);
    features[3].1 = None;
    store.upsert_game(570, "Dota 2", &features).await.unwrap();
    store.upsert_game(730, "No features yet", &[]).await.unwrap();

    let err = assert_err!(store.resolve(570).await);
    assert!(matches!(err, PredictionError::DataUnavailable { app_id: 570, .. }));
    assert!(err.to_string().contains(FEATURE_NAMES[3]));

    assert!(matches!(
        store.resolve(730).await.unwrap_err(),
        PredictionError::DataUnavailable { app_id: 730, .. }
    ));
}

#[tokio::test]
async fn test_upsert_replaces_values() {
    let store = store().await;
    store.upsert_game(10, "Counter-Strike", &all_features(false)).await.unwrap();
    store.upsert_game(10, "Counter-Strike", &all_features(true)).await.unwrap();

    assert_eq!(store.resolve(10).await.unwrap().get("is_holiday_season"), Some(1.0));
}

#[tokio::test]
async fn test_prediction_over_sqlite_with_json_fallback() {
    let sqlite = store().await;
    sqlite.upsert_game(1, "Warehouse game", &all_features(true)).await.unwrap();

    let snapshot = serde_json::json!({ "2": full_features(false) });
    let json = JsonFeatureStore::from_json_str(&snapshot.to_string()).unwrap();

    let source = FallbackFeatureSource::new(Arc::new(sqlite), Arc::new(json));
    let service = prediction_service(Arc::new(source));

    assert_eq!(service.predict(1).await.unwrap().decision, Decision::Wait);
    assert_eq!(service.predict(2).await.unwrap().decision, Decision::BuyNow);
    assert_eq!(
        service.predict(3).await.unwrap_err(),
        PredictionError::NotFound { app_id: 3 }
    );
    assert_eq!(service.health().feature_source, "sqlite+json");
}
