//! Loader configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the manifest and grid files live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Base URL (or directory for [`crate::FileFetcher`]) of the grid pack.
    pub base_url: String,

    /// Manifest path relative to `base_url`.
    pub manifest_path: String,

    /// Upper bound on a single fetch, including the body.
    pub fetch_timeout: Duration,

    pub connect_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/data/ozone".to_string(),
            manifest_path: "manifest.json".to_string(),
            fetch_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("OZONE_DATA_URL") {
            config.base_url = val;
        }

        if let Ok(val) = std::env::var("OZONE_MANIFEST_PATH") {
            config.manifest_path = val;
        }

        if let Ok(val) = std::env::var("GRID_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.fetch_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("GRID_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.connect_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.manifest_path.trim().is_empty() {
            return Err("manifest_path must not be empty".to_string());
        }

        if self.fetch_timeout.is_zero() {
            return Err("fetch_timeout must be > 0".to_string());
        }

        if self.connect_timeout.is_zero() {
            return Err("connect_timeout must be > 0".to_string());
        }

        Ok(())
    }
}
