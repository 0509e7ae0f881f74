//! Webtest driver
//!
//! Drives a [`webtest_harness::Harness`] the way an external test driver
//! would: it triggers `load(path)`, polls `get_logs()` until the run is over
//! and folds the entries into [`RunReport`]s.

pub mod config;
pub mod demo;
pub mod driver;
pub mod error;
pub mod report;

pub use config::DriverConfig;
pub use driver::Driver;
pub use error::{DriverError, DriverResult};
pub use report::{RunReport, RunStatus, SubtestReport, SuiteReport};
