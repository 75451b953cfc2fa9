//! Configuration loading and representation.
//!
//! Settings are read from a JSON file, then selectively overridden from the
//! environment, and handed explicitly to whoever needs them. There is no
//! process-global configuration.
//!
//! ```json
//! {
//!   "logging": { "level": "info", "format": "json" },
//!   "orders": { "stock_policy": "enforce" }
//! }
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use storefront_observability::{LogFormat, LoggingConfig};
use storefront_sales::StockPolicy;

pub const ENV_LOG_LEVEL: &str = "STOREFRONT_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "STOREFRONT_LOG_FORMAT";
pub const ENV_STOCK_POLICY: &str = "STOREFRONT_STOCK_POLICY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Order handling section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderSettings {
    pub stock_policy: StockPolicy,
}

/// Application settings. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub orders: OrderSettings,
}

impl Settings {
    /// Read settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "config file not found; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `STOREFRONT_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// `load` followed by `apply_env`.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(path)?.apply_env()
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = format.parse::<LogFormat>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: ENV_LOG_FORMAT,
                    value: format.clone(),
                }
            })?;
        }
        if let Some(policy) = lookup(ENV_STOCK_POLICY) {
            self.orders.stock_policy = parse_stock_policy(&policy)?;
        }
        Ok(self)
    }
}

fn parse_stock_policy(value: &str) -> Result<StockPolicy, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "enforce" => Ok(StockPolicy::Enforce),
        "permissive" => Ok(StockPolicy::Permissive),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_STOCK_POLICY,
            value: value.to_string(),
        }),
    }
}
