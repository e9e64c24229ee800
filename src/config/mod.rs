//! Configuration module for WaitForIt.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Server, Models, Feature store, ITAD, Decision and Observability.
//!
//! Every sub-config reads through a [`Lookup`] so tests can feed a plain map
//! instead of mutating the process environment.

mod decision_config;
mod feature_store_config;
mod itad_config;
mod model_config;
mod observability_config;
mod server_config;

pub use decision_config::DecisionEnvConfig;
pub use feature_store_config::FeatureStoreEnvConfig;
pub use itad_config::ItadEnvConfig;
pub use model_config::ModelEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::{LogFormat, ServerEnvConfig};

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Key/value source behind every `from_lookup` constructor.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads the real process environment.
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses `key` when present, otherwise returns `default`.
pub(crate) fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerEnvConfig,
    pub models: ModelEnvConfig,
    pub feature_store: FeatureStoreEnvConfig,
    pub itad: ItadEnvConfig,
    pub decision: DecisionEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            server: ServerEnvConfig::from_lookup(lookup).context("Failed to load server config")?,
            models: ModelEnvConfig::from_lookup(lookup).context("Failed to load model config")?,
            feature_store: FeatureStoreEnvConfig::from_lookup(lookup)
                .context("Failed to load feature store config")?,
            itad: ItadEnvConfig::from_lookup(lookup).context("Failed to load ITAD config")?,
            decision: DecisionEnvConfig::from_lookup(lookup)
                .context("Failed to load decision config")?,
            observability: ObservabilityEnvConfig::from_lookup(lookup)
                .context("Failed to load observability config")?,
        })
    }
}

#[cfg(test)]
pub(crate) fn map_lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}
