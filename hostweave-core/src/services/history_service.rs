//! History snapshot service

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{HistoryDeletion, HistorySnapshot};
use crate::utils::datetime;

/// History snapshot service
///
/// Storage keeps snapshots oldest-first; every listing here is newest-first.
/// The reversal is deterministic: equal timestamps keep their insertion
/// order, then the whole sequence is reversed.
pub struct HistoryService {
    ctx: Arc<ServiceContext>,
}

impl HistoryService {
    /// Create a history service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// List all snapshots, newest first
    pub async fn list(&self) -> CoreResult<Vec<HistorySnapshot>> {
        let mut snapshots = self.ctx.snapshot_repository.find_all().await?;
        snapshots.reverse();
        Ok(snapshots)
    }

    /// Get a snapshot by id
    pub async fn get(&self, snapshot_id: &str) -> CoreResult<HistorySnapshot> {
        self.ctx
            .snapshot_repository
            .find_by_id(snapshot_id)
            .await?
            .ok_or_else(|| CoreError::SnapshotNotFound(snapshot_id.to_string()))
    }

    /// Record a new snapshot of resolved hosts content.
    ///
    /// `add_time_ms` is clamped to the newest stored snapshot so storage
    /// order stays monotonically non-decreasing across clock jumps.
    pub async fn record(&self, content: &str) -> CoreResult<HistorySnapshot> {
        let snapshots = self.ctx.snapshot_repository.find_all().await?;

        let now = datetime::now_millis();
        let add_time_ms = snapshots.last().map_or(now, |last| now.max(last.add_time_ms));

        let snapshot = HistorySnapshot {
            id: uuid::Uuid::new_v4().to_string(),
            add_time_ms,
            content: content.to_string(),
        };
        self.ctx.snapshot_repository.append(&snapshot).await?;

        log::debug!("recorded history snapshot {}", snapshot.id);
        Ok(snapshot)
    }

    /// Delete a snapshot and compute the replacement selection.
    ///
    /// The suggested selection is the snapshot now occupying the deleted
    /// item's old position in the newest-first list (the next-newer one slid
    /// into the slot); deleting the oldest selects the item one position
    /// earlier; an emptied list yields no selection.
    pub async fn delete(&self, snapshot_id: &str) -> CoreResult<HistoryDeletion> {
        let before = self.list().await?;
        let old_index = before
            .iter()
            .position(|s| s.id == snapshot_id)
            .ok_or_else(|| CoreError::SnapshotNotFound(snapshot_id.to_string()))?;

        self.ctx.snapshot_repository.delete(snapshot_id).await?;

        let list = self.list().await?;
        let next_selected = list
            .get(old_index)
            .or_else(|| old_index.checked_sub(1).and_then(|i| list.get(i)))
            .map(|s| s.id.clone());

        Ok(HistoryDeletion {
            list,
            next_selected,
        })
    }
}
