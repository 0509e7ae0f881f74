//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{HarnessError, Result};

/// Prefix every loadable test path must start with
pub const DEFAULT_PATH_PREFIX: &str = "tests/webtest/";

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Required prefix for paths passed to `load`
    pub path_prefix: String,

    /// Defaults for condition polling
    pub wait: WaitDefaults,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            wait: WaitDefaults::default(),
        }
    }
}

/// Polling defaults used when a wait is started without explicit options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitDefaults {
    /// Milliseconds slept between two polls
    pub interval_ms: u64,

    /// Number of polls before the wait is reported as timed out
    pub max_tries: u32,
}

impl Default for WaitDefaults {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            max_tries: 50,
        }
    }
}

impl WaitDefaults {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl HarnessConfig {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.path_prefix.is_empty() {
            return Err(HarnessError::InvalidConfig(
                "path_prefix must not be empty".to_string(),
            ));
        }
        if self.wait.max_tries == 0 {
            return Err(HarnessError::InvalidConfig(
                "wait.max_tries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
