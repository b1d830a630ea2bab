use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Severity of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    /// Progress reports from a running traversal.
    Algorithm,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Algorithm => "algorithm",
        }
    }
}

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

impl LogEntry {
    /// Renders the entry as `[HH:MM:SS] message`.
    pub fn display(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Bounded activity log; the oldest entries are dropped once full.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl ActivityLog {
    /// Creates a log keeping at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry and mirrors it to `tracing`. Blank algorithm
    /// messages are ignored.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        if severity == Severity::Algorithm && message.trim().is_empty() {
            return;
        }

        match severity {
            Severity::Error => error!(target: "graphwalk::activity", "{}", message),
            Severity::Warning => warn!(target: "graphwalk::activity", "{}", message),
            Severity::Algorithm => debug!(target: "graphwalk::activity", "{}", message),
            Severity::Info | Severity::Success => {
                info!(target: "graphwalk::activity", "{}", message)
            }
        }

        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: Local::now(),
            severity,
            message,
        });
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if any retained entry's message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }
}
