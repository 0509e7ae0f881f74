//! Append-only, drain-on-read log channel
//!
//! Every component writes results through [`LogChannel::append`]; the driver
//! reads them with [`LogChannel::drain`], which hands back everything emitted
//! since the previous drain and leaves the channel empty.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Kind of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    Pass,
    Fail,
    Info,
    Stack,
    Subtest,
    TestStart,
    TestEnd,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Pass => "PASS",
            LogKind::Fail => "FAIL",
            LogKind::Info => "INFO",
            LogKind::Stack => "STACK",
            LogKind::Subtest => "SUBTEST",
            LogKind::TestStart => "TEST_START",
            LogKind::TestEnd => "TEST_END",
        }
    }

    /// Markers are used for driver synchronization, not pass/fail reporting
    pub fn is_marker(&self) -> bool {
        matches!(self, LogKind::Subtest | LogKind::TestStart | LogKind::TestEnd)
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(LogKind::Pass),
            "FAIL" => Ok(LogKind::Fail),
            "INFO" => Ok(LogKind::Info),
            "STACK" => Ok(LogKind::Stack),
            "SUBTEST" => Ok(LogKind::Subtest),
            "TEST_START" => Ok(LogKind::TestStart),
            "TEST_END" => Ok(LogKind::TestEnd),
            other => Err(format!("unknown log kind: {}", other)),
        }
    }
}

/// A single `(kind, message)` pair. Serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(LogKind, String)", into = "(LogKind, String)")]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<(LogKind, String)> for LogEntry {
    fn from((kind, message): (LogKind, String)) -> Self {
        Self { kind, message }
    }
}

impl From<LogEntry> for (LogKind, String) {
    fn from(entry: LogEntry) -> Self {
        (entry.kind, entry.message)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.message)
    }
}

/// Shared log buffer. Clones refer to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct LogChannel {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl LogChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Never fails.
    pub fn append(&self, kind: LogKind, message: impl Into<String>) {
        let entry = LogEntry::new(kind, message);
        if kind.is_marker() {
            info!("{}", entry);
        } else {
            debug!("{}", entry);
        }
        self.entries.lock().push(entry);
    }

    /// Take every entry emitted since the previous drain
    pub fn drain(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of entries waiting to be drained
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
