//! Error types for the webtest harness

use thiserror::Error;

/// Result type alias using the harness error
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors raised by harness operations that are not reported through the log
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Test registry is closed while a run is in progress")]
    RegistryClosed,

    #[error("A test run is already in progress")]
    AlreadyRunning,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Errors raised by the DOM surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("No element matches selector {0}")]
    NoMatch(String),

    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    #[error("Element {0} is not attached to the frame")]
    Detached(u64),

    #[error("Element {id} is not a {expected}")]
    WrongKind { id: u64, expected: &'static str },
}

/// Failure of the load step itself, independent of any test outcome
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load {0}: no such script")]
    NotFound(String),

    #[error("Error while loading {path}: {reason}")]
    Script { path: String, reason: String },
}
