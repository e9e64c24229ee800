//! IsThereAnyDeal API configuration.

use super::{Lookup, parse_or};
use anyhow::Result;

pub const DEFAULT_ITAD_BASE_URL: &str = "https://api.isthereanydeal.com";

#[derive(Debug, Clone)]
pub struct ItadEnvConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub country: String,
    pub timeout_secs: u64,
}

impl Default for ItadEnvConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ITAD_BASE_URL.to_string(),
            country: "US".to_string(),
            timeout_secs: 5,
        }
    }
}

impl ItadEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_key: lookup("ITAD_API_KEY"),
            base_url: lookup("ITAD_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            country: lookup("ITAD_COUNTRY").unwrap_or(defaults.country),
            timeout_secs: parse_or(lookup, "ITAD_TIMEOUT_SECS", defaults.timeout_secs)?,
        })
    }

    /// Both a key and a base URL are needed to talk to ITAD.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some() && !self.base_url.is_empty()
    }
}
