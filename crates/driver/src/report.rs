//! Structured results folded from drained log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use webtest_harness::{LogEntry, LogKind};

/// Outcome of one `load(path)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// `TEST_END` seen and no `FAIL` logged
    Passed,
    /// `TEST_END` seen with at least one `FAIL`
    Failed,
    /// The load step finished without `TEST_END`
    LoadFailed,
    /// No `TEST_END` before the driver's deadline
    TimedOut,
}

/// Entries logged between one `SUBTEST` marker and the next
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtestReport {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<String>,
    /// Whether the test reached its `Leaving test` entry
    pub completed: bool,
}

/// Result of running a single test path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub path: String,
    pub status: RunStatus,
    pub passed: usize,
    pub failed: usize,
    pub subtests: Vec<SubtestReport>,
    pub logs: Vec<LogEntry>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunReport {
    /// Fold the entries drained while `path` was loading.
    /// `timed_out` tells a missing `TEST_END` caused by the deadline apart
    /// from one caused by a failed load.
    pub fn from_logs(
        path: &str,
        logs: Vec<LogEntry>,
        timed_out: bool,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        let mut passed = 0;
        let mut failed = 0;
        let mut ended = false;
        let mut subtests: Vec<SubtestReport> = Vec::new();

        for entry in &logs {
            match entry.kind {
                LogKind::Subtest => subtests.push(SubtestReport {
                    name: entry.message.clone(),
                    ..Default::default()
                }),
                LogKind::Pass => {
                    passed += 1;
                    if let Some(current) = subtests.last_mut() {
                        current.passed += 1;
                    }
                }
                LogKind::Fail => {
                    failed += 1;
                    if let Some(current) = subtests.last_mut() {
                        current.failed += 1;
                        current.failures.push(entry.message.clone());
                    }
                }
                LogKind::Info => {
                    if let Some(current) = subtests.last_mut() {
                        if entry.message == format!("Leaving test {}", current.name) {
                            current.completed = true;
                        }
                    }
                }
                LogKind::TestEnd if entry.message == path => ended = true,
                _ => {}
            }
        }

        let status = match (ended, timed_out, failed) {
            (true, _, 0) => RunStatus::Passed,
            (true, _, _) => RunStatus::Failed,
            (false, true, _) => RunStatus::TimedOut,
            (false, false, _) => RunStatus::LoadFailed,
        };

        Self {
            path: path.to_string(),
            status,
            passed,
            failed,
            subtests,
            logs,
            started_at,
            duration_ms,
        }
    }

    pub fn success(&self) -> bool {
        self.status == RunStatus::Passed
    }

    /// First failure message, if any
    pub fn first_failure(&self) -> Option<&str> {
        self.logs
            .iter()
            .find(|e| e.kind == LogKind::Fail)
            .map(|e| e.message.as_str())
    }
}

/// Result of running several paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<RunReport>,
}

impl SuiteReport {
    pub fn new(results: Vec<RunReport>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success()).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}
