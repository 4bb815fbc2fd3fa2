//! History snapshot type definitions

use serde::{Deserialize, Serialize};

/// An immutable recorded version of resolved hosts content.
///
/// Snapshots are append-only: created by the refresh engine or an explicit
/// commit, deleted by id, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistorySnapshot {
    /// Snapshot ID (UUID)
    pub id: String,
    /// Creation time, epoch milliseconds; non-decreasing in storage order
    pub add_time_ms: i64,
    /// Resolved hosts-file text at snapshot time
    pub content: String,
}

/// Result of deleting a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDeletion {
    /// Remaining snapshots, newest-first
    pub list: Vec<HistorySnapshot>,
    /// Suggested replacement selection: the snapshot now occupying the
    /// deleted item's old position, else the one before it, else none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_selected: Option<String>,
}
