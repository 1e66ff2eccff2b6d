//! Client configuration.
//!
//! Loaded from a TOML file (by default `.scm/config.toml`):
//!
//! ```toml
//! driver = "stash"
//! base_url = "https://stash.example.com/"
//! token = "..."          # optional; SCM_TOKEN takes precedence
//! user_agent = "scm-bridge"
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use scm::Driver;

/// Default location of the configuration file, relative to the working
/// directory.
pub const DEFAULT_CONFIG_PATH: &str = ".scm/config.toml";

/// Environment variable overriding the configured token.
pub const TOKEN_ENV: &str = "SCM_TOKEN";

/// Errors raised while loading or validating a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration syntax")]
    Parse(#[from] toml::de::Error),

    #[error("base_url '{value}' is not a valid URL")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base_url is required for the {driver} driver")]
    MissingBaseUrl { driver: Driver },

    #[error("timeout_secs must be greater than zero")]
    InvalidTimeout,
}

/// Connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Which adapter to use.
    pub driver: Driver,

    /// API root. Optional for GitHub, where the adapter supplies the
    /// github.com default.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    concat!("scm-bridge/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// A configuration for `driver` at `base_url` with default settings.
    pub fn new(driver: Driver, base_url: Option<String>) -> Self {
        Self {
            driver,
            base_url,
            token: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Reads and validates `path`, then applies the `SCM_TOKEN` override.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        Ok(config.with_token_override(std::env::var(TOKEN_ENV).ok()))
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces the token when `token` is set and non-empty.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Checks the base URL and timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        match &self.base_url {
            Some(value) => {
                Url::parse(value).map_err(|source| ConfigError::InvalidBaseUrl {
                    value: value.clone(),
                    source,
                })?;
            }
            None if self.driver == Driver::Stash => {
                return Err(ConfigError::MissingBaseUrl {
                    driver: self.driver,
                });
            }
            None => {}
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
