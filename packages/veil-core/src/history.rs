//! # Operation History
//!
//! A short, bounded log of completed operations, newest first. Only
//! successful operations are recorded and nothing secret is kept: a name,
//! a size, a time and what happened.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a history entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// A file was sealed into a package
    Encrypted,
    /// A package was opened
    Decrypted,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::Encrypted => f.write_str("encrypted"),
            OperationStatus::Decrypted => f.write_str("decrypted"),
        }
    }
}

/// One completed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Identifier, increasing within a session
    pub id: u64,
    /// Name of the file involved
    pub file_name: String,
    /// Plaintext size in bytes
    pub file_size: u64,
    /// When the operation completed
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub status: OperationStatus,
}

/// Bounded history, newest entry first
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
    next_id: u64,
}

impl History {
    /// Create an empty history keeping at most `limit` entries
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
            next_id: 1,
        }
    }

    /// Record an operation, dropping the oldest entry when full
    pub fn record(
        &mut self,
        file_name: &str,
        file_size: u64,
        timestamp: DateTime<Utc>,
        status: OperationStatus,
    ) -> Option<&HistoryEntry> {
        let id = self.next_id;
        self.next_id += 1;

        if self.limit == 0 {
            return None;
        }

        self.entries.push_front(HistoryEntry {
            id,
            file_name: file_name.to_string(),
            file_size,
            timestamp,
            status,
        });
        self.entries.truncate(self.limit);
        self.entries.front()
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries held
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
