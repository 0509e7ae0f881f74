//! Ordered test registry

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;

use crate::error::{HarnessError, Result};
use crate::harness::Harness;

/// Future produced by a test body
pub type TestFuture = BoxFuture<'static, anyhow::Result<()>>;

type TestBody = Box<dyn FnOnce(Harness) -> TestFuture + Send>;

/// A named, zero-argument asynchronous test
pub struct TestFn {
    name: String,
    body: TestBody,
}

impl TestFn {
    /// Wrap a test body, naming it after the Rust item that implements it.
    /// Closures are anonymous and get an empty name.
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Harness) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::named(default_name::<F>(), body)
    }

    pub fn named<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: FnOnce(Harness) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(move |harness| body(harness).boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the test's future. Panics inside the body's synchronous prefix
    /// surface here, before anything is polled.
    pub(crate) fn start(self, harness: Harness) -> TestFuture {
        (self.body)(harness)
    }
}

impl fmt::Debug for TestFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestFn").field("name", &self.name).finish()
    }
}

fn default_name<F>() -> String {
    let full = std::any::type_name::<F>();
    let path = full.split('<').next().unwrap_or(full);
    match path.rsplit("::").next() {
        Some(last) if !last.starts_with('{') => last.to_string(),
        _ => String::new(),
    }
}

/// Lifecycle of one runner pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Tests waiting to run, in registration order
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: Vec<TestFn>,
    state: RunState,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, test: TestFn) -> Result<()> {
        if self.state == RunState::Running {
            return Err(HarnessError::RegistryClosed);
        }
        self.tests.push(test);
        Ok(())
    }

    /// Move every registered test into an execution list and enter `Running`
    pub fn begin_run(&mut self) -> Result<Vec<TestFn>> {
        if self.state == RunState::Running {
            return Err(HarnessError::AlreadyRunning);
        }
        self.state = RunState::Running;
        Ok(std::mem::take(&mut self.tests))
    }

    pub fn finish(&mut self, outcome: RunState) {
        self.tests.clear();
        self.state = outcome;
    }

    pub fn reset(&mut self) {
        self.tests.clear();
        self.state = RunState::Idle;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.tests.iter().map(|t| t.name.clone()).collect()
    }
}
