//! Snapshot configuration, loadable from TOML.
//!
//! ```toml
//! market_url = "https://api.coinmarketcap.com/v1/ticker/"
//! start = 0
//! limit = 25
//! data_file = "market_data.txt"
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use crate::data::{MarketError, RankWindow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Public ticker endpoint used when no URL is configured.
pub const DEFAULT_MARKET_URL: &str = "https://api.coinmarketcap.com/v1/ticker/";

/// Cache file used when no path is configured.
pub const DEFAULT_DATA_FILE: &str = "market_data.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where to fetch market data from, which ranks to keep, and where to cache it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    pub market_url: String,
    pub start: usize,
    pub limit: usize,
    pub data_file: PathBuf,
}

impl Default for MarketConfig {
    fn default() -> Self {
        let window = RankWindow::default();
        Self {
            market_url: DEFAULT_MARKET_URL.to_string(),
            start: window.start(),
            limit: window.limit(),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl MarketConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The rank window this config selects.
    pub fn window(&self) -> Result<RankWindow, MarketError> {
        RankWindow::new(self.start, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = MarketConfig::from_toml("").unwrap();
        assert_eq!(config, MarketConfig::default());
        assert_eq!(config.market_url, DEFAULT_MARKET_URL);
        assert_eq!(config.limit, 10);
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let config = MarketConfig::from_toml("limit = 25\ndata_file = \"cache/ticker.json\"").unwrap();
        assert_eq!(config.start, 0);
        assert_eq!(config.limit, 25);
        assert_eq!(config.data_file, PathBuf::from("cache/ticker.json"));
        assert_eq!(config.market_url, DEFAULT_MARKET_URL);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = MarketConfig::from_toml("limt = 25").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn inverted_window_fails_validation() {
        let config = MarketConfig {
            start: 10,
            limit: 5,
            ..MarketConfig::default()
        };
        assert!(matches!(
            config.window(),
            Err(MarketError::InvalidWindow { start: 10, limit: 5 })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = MarketConfig::from_file(Path::new("/no/such/tickerlab.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
