//! Application configuration, stored as TOML.
//!
//! Every section and key is optional; missing values fall back to defaults.
//!
//! ```toml
//! [store]
//! path = "bars.json"
//!
//! [query]
//! default_page_size = 20
//! max_page_size = 2000
//!
//! [market_data]
//! base_url = "https://sandbox.iexapis.com"
//! token = "Tpk_..."
//! proxy = "http://10.0.0.1:8080"
//! timeout_secs = 30
//! max_retries = 3
//!
//! [logging]
//! filter = "barstore_core=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub query: QueryConfig,
    pub market_data: MarketDataConfig,
    pub logging: LoggingConfig,
}

/// Where bars are persisted. No path means an in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
        }
    }
}

/// Upper bound for `market_data.max_retries`.
pub const MAX_RETRIES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// HTTP proxy URL applied to every market data request.
    pub proxy: Option<String>,
    pub timeout_secs: u64,
    /// Retries after the first attempt, at most [`MAX_RETRIES`].
    pub max_retries: u32,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sandbox.iexapis.com".into(),
            token: None,
            proxy: None,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".into(),
        }
    }
}

impl AppConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let query = &self.query;
        if query.default_page_size == 0 || query.max_page_size == 0 {
            return Err(ConfigError::Invalid("page sizes must be positive".into()));
        }
        if query.default_page_size > query.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} exceeds max_page_size {}",
                query.default_page_size, query.max_page_size
            )));
        }
        if self.market_data.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("market_data.base_url is empty".into()));
        }
        if self.market_data.timeout_secs == 0 {
            return Err(ConfigError::Invalid("market_data.timeout_secs must be positive".into()));
        }
        if self.market_data.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "market_data.max_retries {} exceeds {MAX_RETRIES}",
                self.market_data.max_retries
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_is_default() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.query.default_page_size, 20);
        assert!(config.store.path.is_none());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [store]
            path = "data/bars.json"

            [market_data]
            token = "Tpk_x"
            proxy = "http://10.0.0.1:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.path, Some(PathBuf::from("data/bars.json")));
        assert_eq!(config.market_data.token.as_deref(), Some("Tpk_x"));
        assert_eq!(config.market_data.max_retries, 3);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn rejects_inconsistent_page_sizes() {
        let err = AppConfig::from_toml("[query]\ndefault_page_size = 50\nmax_page_size = 10\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = AppConfig::from_toml("[query]\ndefault_page_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn caps_max_retries() {
        let config = AppConfig::from_toml("[market_data]\nmax_retries = 10\n").unwrap();
        assert_eq!(config.market_data.max_retries, 10);
        let err = AppConfig::from_toml("[market_data]\nmax_retries = 40\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("max_retries")));
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            AppConfig::from_toml("[query\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[query]\nmax_page_size = \"big\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nfilter = \"debug\"").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.filter, "debug");

        let missing = AppConfig::from_file(Path::new("/nonexistent/barstore.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
