//! Test script loading
//!
//! `load(path)` has two explicit phases. The load phase hands the path to a
//! [`ModuleLoader`], which lets the script register its tests. Only if that
//! succeeds does the run phase start, followed by the `TEST_END` marker. A
//! failed load leaves `TEST_START` unmatched, which is how a driver detects it.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::harness::Harness;
use crate::log::LogKind;
use crate::runner::panic_message;

/// Resolves a test path and lets the script behind it register its tests
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, path: &str, harness: &Harness) -> Result<(), LoadError>;
}

/// A test script: registers tests on the harness it is loaded into
pub trait TestScript: Send + Sync {
    fn register(&self, harness: &Harness) -> anyhow::Result<()>;
}

impl<F> TestScript for F
where
    F: Fn(&Harness) -> anyhow::Result<()> + Send + Sync,
{
    fn register(&self, harness: &Harness) -> anyhow::Result<()> {
        self(harness)
    }
}

/// In-process catalog of test scripts keyed by path
#[derive(Clone, Default)]
pub struct ScriptCatalog {
    scripts: BTreeMap<String, Arc<dyn TestScript>>,
}

impl ScriptCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, script: impl TestScript + 'static) {
        self.scripts.insert(path.into(), Arc::new(script));
    }

    pub fn with_script(mut self, path: impl Into<String>, script: impl TestScript + 'static) -> Self {
        self.insert(path, script);
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.scripts.contains_key(path)
    }
}

#[async_trait]
impl ModuleLoader for ScriptCatalog {
    async fn load(&self, path: &str, harness: &Harness) -> Result<(), LoadError> {
        let script = self
            .scripts
            .get(path)
            .ok_or_else(|| LoadError::NotFound(path.to_string()))?;

        let registered = std::panic::catch_unwind(AssertUnwindSafe(|| script.register(harness)))
            .map_err(|payload| LoadError::Script {
                path: path.to_string(),
                reason: format!("panicked: {}", panic_message(payload.as_ref())),
            })?;

        registered.map_err(|err| LoadError::Script {
            path: path.to_string(),
            reason: format!("{:#}", err),
        })
    }
}

impl Harness {
    /// Load the script at `path`, run what it registered and bracket the
    /// run with `TEST_START`/`TEST_END`. Every failure ends up in the log.
    pub async fn load(&self, path: &str) {
        // Rejections are serialized too, so their FAIL never lands inside
        // another load's TEST_START/TEST_END bracket.
        let _guard = self.load_lock().lock().await;

        if !path.starts_with(self.config().path_prefix.as_str()) {
            warn!("Rejecting test path {}", path);
            self.log()
                .append(LogKind::Fail, format!("Unsupported test path {}", path));
            return;
        }

        self.reset();
        self.log().append(LogKind::TestStart, path);

        if let Err(err) = self.loader().load(path, self).await {
            warn!("Load failed: {}", err);
            self.log().append(LogKind::Fail, err.to_string());
            return;
        }
        debug!("{} registered {} test(s)", path, self.pending_tests());

        match self.run().await {
            Ok(state) => info!("Run of {} finished: {:?}", path, state),
            Err(err) => self.log().append(LogKind::Fail, err.to_string()),
        }

        self.log().append(LogKind::TestEnd, path);
    }
}
