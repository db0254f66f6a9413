use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of entries kept in the event log
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Severity tag attached to every event log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Payment,
    Danger,
    Alert,
    Success,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Info => "info",
            LogKind::Payment => "payment",
            LogKind::Danger => "danger",
            LogKind::Alert => "alert",
            LogKind::Success => "success",
        }
    }
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of the operator-facing event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    /// Wall-clock time of day, `HH:MM:SS`
    pub time: String,
    pub agent: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

/// Bounded event log, newest entry first.
///
/// Ids come from a counter owned by the buffer, so they keep increasing
/// after old entries fall off the end.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            next_id: 1,
        }
    }

    /// Prepend an entry, dropping the oldest once over capacity.
    pub fn push(
        &mut self,
        agent: impl Into<String>,
        message: impl Into<String>,
        kind: LogKind,
        at: NaiveTime,
    ) -> &LogEntry {
        let entry = LogEntry {
            id: self.next_id,
            time: at.format("%H:%M:%S").to_string(),
            agent: agent.into(),
            message: message.into(),
            kind,
        };
        self.next_id += 1;

        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest entry, if any
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Entries newest first
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
