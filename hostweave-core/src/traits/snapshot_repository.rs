//! History snapshot persistence abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::HistorySnapshot;

/// History snapshot repository Trait
///
/// Storage order is insertion order, oldest first; `add_time_ms` is
/// non-decreasing along it. Snapshots are immutable: there is no update
/// operation.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Load all snapshots in storage order (oldest first)
    async fn find_all(&self) -> CoreResult<Vec<HistorySnapshot>>;

    /// Get a snapshot by id
    ///
    /// # Arguments
    /// * `id` - Snapshot ID
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<HistorySnapshot>>;

    /// Append a snapshot
    ///
    /// # Arguments
    /// * `snapshot` - Snapshot data
    async fn append(&self, snapshot: &HistorySnapshot) -> CoreResult<()>;

    /// Delete a snapshot by id (no-op when absent)
    ///
    /// # Arguments
    /// * `id` - Snapshot ID
    async fn delete(&self, id: &str) -> CoreResult<()>;
}
