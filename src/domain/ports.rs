use crate::domain::errors::{ItadError, PredictionError};
use crate::domain::game::{GameInfo, GameSearchHit};
use crate::domain::ml::feature_registry::FeatureVector;
use async_trait::async_trait;

/// Resolves the feature vector for a Steam app id.
///
/// Implementations return `NotFound` for unknown games and `DataUnavailable`
/// when the game is known but its upstream data is incomplete.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn resolve(&self, app_id: u64) -> Result<FeatureVector, PredictionError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Read-only view of an external game catalog (IsThereAnyDeal).
#[async_trait]
pub trait GameCatalog: Send + Sync {
    fn is_enabled(&self) -> bool;

    async fn search_games(&self, title: &str, limit: usize)
    -> Result<Vec<GameSearchHit>, ItadError>;

    /// Maps a Steam app id to the catalog's own game id.
    async fn lookup_appid(&self, app_id: u64) -> Result<Option<String>, ItadError>;

    async fn game_info(&self, itad_id: &str) -> Result<Option<GameInfo>, ItadError>;

    /// Current best price as `(amount, currency, shop)`.
    async fn current_price(
        &self,
        itad_id: &str,
        country: &str,
    ) -> Result<Option<(f64, String, String)>, ItadError>;
}
