//! Decision thresholds.

use super::{Lookup, parse_or};
use crate::domain::prediction::{DEFAULT_BUY_THRESHOLD, DEFAULT_WAIT_THRESHOLD, DecisionPolicy};
use anyhow::{Result, anyhow};

#[derive(Debug, Clone)]
pub struct DecisionEnvConfig {
    pub wait_threshold: f64,
    pub buy_threshold: f64,
    /// Cutoff for `will_discount` when the caller does not supply one
    pub default_threshold: f64,
}

impl DecisionEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let config = Self {
            wait_threshold: parse_or(lookup, "WAIT_THRESHOLD", DEFAULT_WAIT_THRESHOLD)?,
            buy_threshold: parse_or(lookup, "BUY_THRESHOLD", DEFAULT_BUY_THRESHOLD)?,
            default_threshold: parse_or(lookup, "DEFAULT_THRESHOLD", 0.5)?,
        };
        config.policy()?;
        if !(0.0..=1.0).contains(&config.default_threshold) {
            return Err(anyhow!(
                "DEFAULT_THRESHOLD must lie in [0, 1], got {}",
                config.default_threshold
            ));
        }
        Ok(config)
    }

    pub fn policy(&self) -> Result<DecisionPolicy> {
        DecisionPolicy::new(self.wait_threshold, self.buy_threshold).map_err(|e| anyhow!(e))
    }
}
