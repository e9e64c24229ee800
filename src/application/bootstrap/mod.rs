//! Wiring shared by the `server` and `precompute_upcoming` binaries.

pub mod persistence;
pub mod services;

pub use persistence::{FeatureSourceBootstrap, FeatureSourceHandle};
pub use services::{ServicesBootstrap, ServicesHandle};
