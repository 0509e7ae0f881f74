//! Harness context
//!
//! One [`Harness`] owns the log channel, the test registry, the frame under
//! test and the script loader. Clones share all of it, so a test body can
//! hold its own handle while the runner holds another.

use parking_lot::Mutex;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use crate::assert::{self, SameValue};
use crate::config::HarnessConfig;
use crate::error::{DomError, Result};
use crate::frame::{ElementHandle, Frame};
use crate::loader::ModuleLoader;
use crate::log::{LogChannel, LogEntry};
use crate::registry::{RunState, TestFn, TestRegistry};

struct HarnessInner {
    config: HarnessConfig,
    log: LogChannel,
    registry: Mutex<TestRegistry>,
    frame: Arc<dyn Frame>,
    loader: Arc<dyn ModuleLoader>,
    load_lock: tokio::sync::Mutex<()>,
}

/// Shared harness handle
#[derive(Clone)]
pub struct Harness {
    inner: Arc<HarnessInner>,
}

impl Harness {
    /// Create a harness with the default configuration
    pub fn new(frame: Arc<dyn Frame>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self::with_config(HarnessConfig::default(), frame, loader)
    }

    pub fn with_config(
        config: HarnessConfig,
        frame: Arc<dyn Frame>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            inner: Arc::new(HarnessInner {
                config,
                log: LogChannel::new(),
                registry: Mutex::new(TestRegistry::new()),
                frame,
                loader,
                load_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.inner.config
    }

    pub fn log(&self) -> &LogChannel {
        &self.inner.log
    }

    pub fn frame(&self) -> &dyn Frame {
        self.inner.frame.as_ref()
    }

    pub(crate) fn registry(&self) -> &Mutex<TestRegistry> {
        &self.inner.registry
    }

    pub(crate) fn loader(&self) -> &dyn ModuleLoader {
        self.inner.loader.as_ref()
    }

    pub(crate) fn load_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.inner.load_lock
    }

    /// Driver-facing drain of everything logged since the last call
    pub fn get_logs(&self) -> Vec<LogEntry> {
        self.inner.log.drain()
    }

    /// Drop pending tests and return to `Idle`. The log channel is untouched.
    pub fn reset(&self) {
        self.inner.registry.lock().reset();
    }

    pub fn run_state(&self) -> RunState {
        self.inner.registry.lock().state()
    }

    pub fn pending_tests(&self) -> usize {
        self.inner.registry.lock().len()
    }

    pub fn register(&self, test: TestFn) -> Result<()> {
        self.inner.registry.lock().register(test)
    }

    /// Registration entry point for test scripts
    pub fn add_test<F, Fut>(&self, body: F) -> Result<()>
    where
        F: FnOnce(Harness) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register(TestFn::new(body))
    }

    pub fn add_named_test<F, Fut>(&self, name: &str, body: F) -> Result<()>
    where
        F: FnOnce(Harness) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register(TestFn::named(name, body))
    }

    pub fn ok(&self, condition: bool, msg: &str) {
        assert::ok(self.log(), condition, msg);
    }

    pub fn is<A, E>(&self, actual: A, expected: E, msg: &str)
    where
        A: SameValue<E> + Display,
        E: Display,
    {
        assert::is(self.log(), actual, expected, msg);
    }

    pub fn isnot<A, E>(&self, actual: A, unexpected: E, msg: &str)
    where
        A: SameValue<E> + Display,
        E: Display,
    {
        assert::isnot(self.log(), actual, unexpected, msg);
    }

    pub fn info(&self, msg: &str) {
        assert::info(self.log(), msg);
    }

    /// Look up an element in the frame
    pub fn query(&self, selector: &str) -> std::result::Result<ElementHandle, DomError> {
        self.inner.frame.query(selector)
    }
}
