//! Error types for the driver

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Harness error: {0}")]
    Harness(#[from] webtest_harness::HarnessError),

    #[error("Page setup failed: {0}")]
    Dom(#[from] webtest_harness::DomError),

    #[error("Load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DriverResult<T> = Result<T, DriverError>;
