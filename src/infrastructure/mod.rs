pub mod core;
pub mod feature_store;
pub mod itad;
pub mod observability;
pub mod persistence;

pub use feature_store::{FallbackFeatureSource, ItadFeatureSource, JsonFeatureStore, SqliteFeatureStore};
pub use itad::ItadClient;
pub use observability::Metrics;
pub use persistence::Database;
