//! Pull-based driver loop
//!
//! The driver starts `load(path)` and then only observes the harness through
//! `get_logs()`. A run is over when `TEST_END path` shows up, when the load
//! finishes without it, or when the driver's own deadline passes.

use chrono::Utc;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use webtest_harness::{Harness, LogEntry, LogKind};

use crate::config::DriverConfig;
use crate::error::DriverResult;
use crate::report::{RunReport, RunStatus, SuiteReport};

pub struct Driver {
    harness: Harness,
    config: DriverConfig,
}

impl Driver {
    pub fn new(harness: Harness, config: DriverConfig) -> Self {
        Self { harness, config }
    }

    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// Load one path and collect its logs into a report
    pub async fn run_path(&self, path: &str) -> DriverResult<RunReport> {
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.config.timeout();
        let end_marker = LogEntry::new(LogKind::TestEnd, path);

        let harness = self.harness.clone();
        let owned = path.to_string();
        let mut task = tokio::spawn(async move { harness.load(&owned).await });

        let mut logs = Vec::new();
        let mut finished = false;
        let mut timed_out = false;

        loop {
            let batch = self.harness.get_logs();
            if !batch.is_empty() {
                debug!("Drained {} entries for {}", batch.len(), path);
            }
            let ended = batch.contains(&end_marker);
            logs.extend(batch);

            if ended || finished {
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                timed_out = true;
                break;
            }

            tokio::select! {
                joined = &mut task, if !finished => {
                    joined?;
                    finished = true;
                }
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
            }
        }

        if timed_out {
            warn!("No TEST_END for {} after {:?}", path, self.config.timeout());
            task.abort();
            match task.await {
                Err(err) if err.is_cancelled() => {}
                joined => joined?,
            }
            // Whatever the load logged before it stopped belongs to this run.
            logs.extend(self.harness.get_logs());
        } else if !finished {
            task.await?;
        }

        let report = RunReport::from_logs(
            path,
            logs,
            timed_out,
            started_at,
            start.elapsed().as_millis() as u64,
        );

        match report.status {
            RunStatus::Passed => info!("✓ {} ({} ms)", path, report.duration_ms),
            status => error!(
                "✗ {} {:?} - {}",
                path,
                status,
                report.first_failure().unwrap_or("missing TEST_END")
            ),
        }
        Ok(report)
    }

    /// Run paths one after another
    pub async fn run_paths<S: AsRef<str>>(&self, paths: &[S]) -> DriverResult<SuiteReport> {
        let start = Instant::now();
        info!("Running {} test path(s)...", paths.len());

        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            results.push(self.run_path(path.as_ref()).await?);
        }

        let suite = SuiteReport::new(results, start.elapsed().as_millis() as u64);
        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );
        Ok(suite)
    }

    /// Write results to `test-results.json` in the output directory
    pub fn write_results(&self, suite: &SuiteReport) -> DriverResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(suite)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
