//! Run configuration for the geocoder and the state oracle.
//!
//! Defaults follow the Nominatim usage policy (one request per second,
//! identifying User-Agent). A JSON file may override any field; the
//! oracle credential comes from `ANTHROPIC_API_KEY` when not set there.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    /// Minimum gap between external calls.
    pub min_interval_ms: u64,
    /// Per-call network timeout.
    pub timeout_secs: u64,
    /// Consecutive transport failures before the service is treated as
    /// unreachable (0 disables the check).
    pub unreachable_after: u32,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".into(),
            user_agent: format!("AgencyLocator/{}", env!("CARGO_PKG_VERSION")),
            min_interval_ms: 1000,
            timeout_secs: 10,
            unreachable_after: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_version: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-5-haiku-latest".into(),
            api_version: "2023-06-01".into(),
            api_key: None,
            max_tokens: 50,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoder: GeocoderConfig,
    pub oracle: OracleConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Config {
    /// Load from a JSON file; missing fields keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Fill the oracle key from the environment if the file left it unset.
    pub fn with_env(mut self) -> Self {
        if self.oracle.api_key.is_none() {
            self.oracle.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
        }
        self
    }
}
