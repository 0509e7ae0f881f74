//! Sequential test runner
//!
//! Tests run strictly one after another. Each one is bracketed by a
//! `SUBTEST` marker and enter/leave `INFO` entries. The first error or panic
//! logs `FAIL` and `STACK` and ends the pass; whatever was still queued is
//! dropped without a log entry.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{info, warn};

use crate::error::Result;
use crate::harness::Harness;
use crate::log::LogKind;
use crate::registry::{RunState, TestFn};

/// Why a test body stopped early
struct Failure {
    message: String,
    stack: String,
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test panicked".to_string()
    }
}

impl Harness {
    /// Drain the registry and run every test in registration order
    pub async fn run(&self) -> Result<RunState> {
        let tests = self.registry().lock().begin_run()?;
        let total = tests.len();
        info!("Running {} test(s)", total);

        let mut outcome = RunState::Completed;
        for (index, test) in tests.into_iter().enumerate() {
            let name = test.name().to_string();
            self.log().append(LogKind::Subtest, name.as_str());
            self.log()
                .append(LogKind::Info, format!("Entering test {}", name));

            match self.run_one(test).await {
                Ok(()) => {
                    self.log()
                        .append(LogKind::Info, format!("Leaving test {}", name));
                }
                Err(failure) => {
                    self.log().append(LogKind::Fail, failure.message);
                    self.log().append(LogKind::Stack, failure.stack);
                    warn!(
                        "Test {:?} failed; dropping {} remaining test(s)",
                        name,
                        total - index - 1
                    );
                    outcome = RunState::Aborted;
                    break;
                }
            }
        }

        self.registry().lock().finish(outcome);
        Ok(outcome)
    }

    async fn run_one(&self, test: TestFn) -> std::result::Result<(), Failure> {
        let name = test.name().to_string();
        let harness = self.clone();

        let future = std::panic::catch_unwind(AssertUnwindSafe(move || test.start(harness)))
            .map_err(|payload| panicked(&name, payload))?;

        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(Failure {
                message: format!("{:#}", err),
                stack: format!("{:?}", err),
            }),
            Err(payload) => Err(panicked(&name, payload)),
        }
    }
}

fn panicked(name: &str, payload: Box<dyn Any + Send>) -> Failure {
    let message = panic_message(payload.as_ref());
    Failure {
        stack: format!("panicked in test {:?}: {}", name, message),
        message,
    }
}
