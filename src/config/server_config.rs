//! HTTP server configuration parsing from environment variables.

use super::{Lookup, parse_or};
use anyhow::{Result, bail};
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => bail!("Invalid LOG_FORMAT: {}. Must be 'pretty' or 'json'", s),
        }
    }
}

/// Server environment configuration
#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub app_env: String,
    pub bind_address: IpAddr,
    pub port: u16,
    pub log_format: LogFormat,
    /// JSON written by the `precompute_upcoming` binary
    pub upcoming_path: PathBuf,
}

impl ServerEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => LogFormat::from_str(&raw)?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            app_env: lookup("APP_ENV").unwrap_or_else(|| "dev".to_string()),
            bind_address: parse_or(lookup, "BIND_ADDRESS", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or(lookup, "PORT", 8000)?,
            log_format,
            upcoming_path: lookup("UPCOMING_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("artifacts/upcoming_predictions.json")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::map_lookup;

    #[test]
    fn test_server_config_overrides() {
        let lookup = map_lookup(&[
            ("PORT", "9000"),
            ("BIND_ADDRESS", "127.0.0.1"),
            ("LOG_FORMAT", "JSON"),
            ("APP_ENV", "prod"),
        ]);
        let config = ServerEnvConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.app_env, "prod");
    }

    #[test]
    fn test_invalid_log_format() {
        let lookup = map_lookup(&[("LOG_FORMAT", "xml")]);
        assert!(ServerEnvConfig::from_lookup(&lookup).is_err());
    }
}
