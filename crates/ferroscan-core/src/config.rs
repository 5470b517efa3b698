//! TOML configuration.
//!
//! Every section is optional; a missing file section falls back to defaults.
//!
//! ```toml
//! [criteria]
//! minPrice = 1.0
//! maxPrice = 20.0
//!
//! [monitor]
//! interval_secs = 300
//! tickers = ["VERO", "JFBR"]
//!
//! [finnhub]
//! api_key = "..."
//! calls_per_minute = 60
//!
//! [ibkr]
//! gateway_url = "http://localhost:5000"
//! ```
//!
//! Environment variables win over the file:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `FERROSCAN_FINNHUB_API_KEY` (or `FINNHUB_API_KEY`) | `finnhub.api_key` |
//! | `FERROSCAN_IBKR_GATEWAY_URL` | `ibkr.gateway_url` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::{finnhub, ibkr};
use crate::{ScanCriteria, Symbol, ValidationError};

pub const ENV_FINNHUB_API_KEY: &str = "FERROSCAN_FINNHUB_API_KEY";
pub const ENV_FINNHUB_API_KEY_FALLBACK: &str = "FINNHUB_API_KEY";
pub const ENV_IBKR_GATEWAY_URL: &str = "FERROSCAN_IBKR_GATEWAY_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub criteria: ScanCriteria,
    pub monitor: MonitorConfig,
    pub finnhub: FinnhubConfig,
    pub ibkr: IbkrConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub tickers: Vec<Symbol>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            tickers: Vec::new(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinnhubConfig {
    #[serde(default = "default_finnhub_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_calls_per_minute")]
    pub calls_per_minute: u32,
}

impl Default for FinnhubConfig {
    fn default() -> Self {
        Self {
            base_url: default_finnhub_base_url(),
            api_key: None,
            calls_per_minute: default_calls_per_minute(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbkrConfig {
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

impl Default for IbkrConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_finnhub_base_url() -> String {
    String::from(finnhub::DEFAULT_BASE_URL)
}

fn default_calls_per_minute() -> u32 {
    finnhub::DEFAULT_CALLS_PER_MINUTE
}

fn default_gateway_url() -> String {
    String::from(ibkr::DEFAULT_GATEWAY_URL)
}

impl ScannerConfig {
    /// Parses and validates a TOML document. No environment overrides.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// File (when given) or defaults, then process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Applies overrides read through `lookup`; blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(api_key) =
            present(ENV_FINNHUB_API_KEY).or_else(|| present(ENV_FINNHUB_API_KEY_FALLBACK))
        {
            self.finnhub.api_key = Some(api_key);
        }
        if let Some(gateway_url) = present(ENV_IBKR_GATEWAY_URL) {
            self.ibkr.gateway_url = gateway_url;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.criteria.validate()?;
        if self.monitor.interval_secs == 0 {
            return Err(ValidationError::InvalidInterval);
        }
        if self.finnhub.calls_per_minute < finnhub::CALLS_PER_TICKER {
            return Err(ValidationError::BelowMinimum {
                field: "finnhub.calls_per_minute",
                min: u64::from(finnhub::CALLS_PER_TICKER),
            });
        }
        Ok(())
    }
}
