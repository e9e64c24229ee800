//! Feature source selection.
//!
//! The warehouse (`FEATURE_DB_URL`) takes precedence over a JSON snapshot
//! (`FEATURE_JSON_PATH`). With `FEATURE_ITAD_FALLBACK` enabled, games missing
//! from the primary store are built on the fly from ITAD metadata.

use super::{Lookup, parse_or};
use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FeatureStoreEnvConfig {
    pub database_url: Option<String>,
    pub json_path: Option<PathBuf>,
    pub itad_fallback: bool,
}

impl FeatureStoreEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            database_url: lookup("FEATURE_DB_URL"),
            json_path: lookup("FEATURE_JSON_PATH").map(PathBuf::from),
            itad_fallback: parse_or(lookup, "FEATURE_ITAD_FALLBACK", false)?,
        })
    }
}
