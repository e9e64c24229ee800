pub mod feature_registry;

pub use feature_registry::{FEATURE_NAMES, FeatureOrigin, FeatureVector};
