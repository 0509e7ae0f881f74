//! Driver configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use webtest_harness::HarnessConfig;

use crate::error::DriverResult;

/// Driver configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Milliseconds between two log polls
    pub poll_interval_ms: u64,

    /// Give up on a path after this many seconds without `TEST_END`
    pub timeout_secs: u64,

    /// Directory for `test-results.json`
    pub output_dir: PathBuf,

    /// Settings handed to the harness
    pub harness: HarnessConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            timeout_secs: 60,
            output_dir: PathBuf::from("test-results"),
            harness: HarnessConfig::default(),
        }
    }
}

impl DriverConfig {
    pub fn from_toml(text: &str) -> DriverResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.harness.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> DriverResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
