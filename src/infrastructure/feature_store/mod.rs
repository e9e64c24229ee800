//! [`FeatureSource`](crate::domain::ports::FeatureSource) implementations.

pub mod fallback;
pub mod itad;
pub mod json;
pub mod sqlite;

pub use fallback::FallbackFeatureSource;
pub use itad::ItadFeatureSource;
pub use json::JsonFeatureStore;
pub use sqlite::SqliteFeatureStore;
