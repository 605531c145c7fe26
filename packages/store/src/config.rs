//! Dashboard configuration.
//!
//! Settings come from an optional TOML file, then environment variables
//! (`ANALYSIS_DATA_URL`, `ANALYSIS_TIMEOUT_SECS`), then whatever the
//! caller overrides explicitly. Only the data URL is required.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the dataset URL.
pub const DATA_URL_ENV: &str = "ANALYSIS_DATA_URL";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "ANALYSIS_TIMEOUT_SECS";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has the wrong fields.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// No dataset URL was configured anywhere.
    #[error("No analysis data URL configured (set {DATA_URL_ENV} or pass --url)")]
    MissingUrl,

    /// The dataset URL is not an absolute HTTP(S) URL.
    #[error("Invalid analysis data URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// The timeout is not a positive integer.
    #[error("Invalid timeout '{value}': expected a positive number of seconds")]
    InvalidTimeout {
        /// The offending value.
        value: String,
    },
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("ride_map/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings for the dashboard's single dataset fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardConfig {
    /// URL of the consolidated analysis dataset.
    #[serde(default)]
    pub data_url: String,
    /// Per-request timeout in seconds, enforced by the transport.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// `User-Agent` header sent with the request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_url: String::new(),
            request_timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl DashboardConfig {
    /// Creates a config for `data_url` with default settings.
    #[must_use]
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
            ..Self::default()
        }
    }

    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is malformed.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Toml`] if it is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Builds a config from environment variables alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value or
    /// the resulting config fails [`Self::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `ANALYSIS_DATA_URL` and `ANALYSIS_TIMEOUT_SECS` on top of
    /// this config, when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeout`] if the timeout variable is
    /// not a positive integer.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(
            std::env::var(DATA_URL_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }

    fn with_overrides(
        mut self,
        url: Option<String>,
        timeout: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.data_url = url;
        }
        if let Some(value) = timeout {
            self.request_timeout_secs = value
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout { value })?;
        }
        Ok(self)
    }

    /// Checks that a dataset URL is configured and is absolute HTTP(S).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUrl`], [`ConfigError::InvalidUrl`] or
    /// [`ConfigError::InvalidTimeout`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }

        let url = reqwest::Url::parse(&self.data_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.data_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.data_url.clone(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
