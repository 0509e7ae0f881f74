//! Webtest harness
//!
//! The in-page half of a pull-based browser test protocol. A driver asks the
//! harness to `load` a test script and polls `get_logs` for results; the
//! harness runs the script's tests one at a time inside the content frame.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ driver ── load(path) ──► Harness ◄── get_logs() ── driver   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  loader    ModuleLoader::load(path) -> tests registered     │
//! │  runner    TestRegistry drained in order, FAIL+STACK aborts │
//! │  assert    ok / is / isnot / info                           │
//! │  sync      sleep, wait_for_condition, wait_for_shown,       │
//! │            wait_for_load, set_text, click_checkbox, click   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  LogChannel (append / drain)          Frame (DOM surface)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Run order per load: `TEST_START path`, then per test `SUBTEST name`,
//! `INFO Entering test`, the test's own entries, `INFO Leaving test`; an
//! optional `FAIL`/`STACK` pair on abort; `TEST_END path` unless the script
//! failed to load.

pub mod assert;
pub mod config;
pub mod error;
pub mod frame;
pub mod harness;
pub mod loader;
pub mod log;
pub mod page;
pub mod registry;
pub mod runner;
pub mod sync;

pub use assert::SameValue;
pub use config::{HarnessConfig, WaitDefaults};
pub use error::{DomError, HarnessError, LoadError, Result};
pub use frame::{DomEvent, ElementHandle, EventTarget, Frame};
pub use harness::Harness;
pub use loader::{ModuleLoader, ScriptCatalog, TestScript};
pub use log::{LogChannel, LogEntry, LogKind};
pub use page::MemoryFrame;
pub use registry::{RunState, TestFn, TestRegistry};
pub use sync::{Condition, WaitOptions};
