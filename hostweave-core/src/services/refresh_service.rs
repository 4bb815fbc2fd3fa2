//! Remote entry refresh service

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{CoreError, CoreResult};
use crate::services::{HistoryService, ServiceContext};
use crate::tree;
use crate::types::{EntryKind, RefreshData};
use crate::utils::datetime;

/// Result of a scheduled-refresh sweep
#[derive(Debug, Clone, Default)]
pub struct RefreshSweepResult {
    /// Number of entries refreshed successfully
    pub success_count: usize,
    /// Number of entries whose refresh failed
    pub error_count: usize,
    /// Number of entries skipped because a refresh was already in flight
    pub busy_count: usize,
}

/// Remote entry refresh service
///
/// At most one refresh is in flight per entry id; a second request for the
/// same id is rejected with `RefreshBusy` rather than queued. Refreshes of
/// distinct entries fetch concurrently; the commit back into the entry list
/// is serialized through the context's write lock.
pub struct RefreshService {
    ctx: Arc<ServiceContext>,
    history: Arc<HistoryService>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Removes the entry id from the in-flight set when the refresh ends,
/// whichever way it ends.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    entry_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.entry_id);
    }
}

impl RefreshService {
    /// Create a refresh service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, history: Arc<HistoryService>) -> Self {
        Self {
            ctx,
            history,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Mark `entry_id` as in flight, or reject with `RefreshBusy`.
    fn try_acquire(&self, entry_id: &str) -> CoreResult<InFlightGuard> {
        let mut set = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !set.insert(entry_id.to_string()) {
            return Err(CoreError::RefreshBusy(entry_id.to_string()));
        }
        Ok(InFlightGuard {
            set: Arc::clone(&self.in_flight),
            entry_id: entry_id.to_string(),
        })
    }

    /// Refresh a remote entry: fetch its URL, store the content, stamp
    /// `last_refresh` / `last_refresh_ms`.
    ///
    /// A failed fetch mutates nothing. A fetch that returns identical
    /// content still updates the timestamps: refresh reflects the recency of
    /// the attempt, not of change. If the entry is deleted while the fetch
    /// is outstanding the result is discarded.
    pub async fn refresh(&self, entry_id: &str) -> CoreResult<RefreshData> {
        let _guard = self.try_acquire(entry_id)?;

        let list = self.ctx.entry_repository.find_all().await?;
        let entry = tree::find_by_id(&list, entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        if entry.kind != EntryKind::Remote {
            return Err(CoreError::ValidationError(format!(
                "entry is not remote: {entry_id}"
            )));
        }
        let url = entry
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                CoreError::ValidationError(format!("remote entry has no url: {entry_id}"))
            })?
            .to_string();
        drop(list);

        let content = match self.ctx.fetcher.fetch(&url).await {
            Ok(content) => content,
            Err(e) => {
                if e.is_expected() {
                    log::warn!("refresh of {entry_id} failed: {e}");
                } else {
                    log::error!("refresh of {entry_id} failed: {e}");
                }
                return Err(e);
            }
        };

        let data = self.commit(entry_id, &content).await?;

        // Snapshot failures must not fail an otherwise successful refresh.
        if let Err(e) = self.history.record(&content).await {
            log::warn!("failed to record history snapshot for {entry_id}: {e}");
        }

        log::info!("refreshed entry {entry_id} from {url}");
        Ok(data)
    }

    /// Commit fetched content: re-read the list under the write lock,
    /// discard if the entry vanished, otherwise swap in a freshly stamped
    /// record and save.
    async fn commit(&self, entry_id: &str, content: &str) -> CoreResult<RefreshData> {
        let _write = self.ctx.entry_write_lock.lock().await;

        let mut list = self.ctx.entry_repository.find_all().await?;
        let Some(entry) = tree::find_by_id_mut(&mut list, entry_id) else {
            log::warn!("entry {entry_id} deleted during refresh, discarding fetched content");
            return Err(CoreError::EntryNotFound(entry_id.to_string()));
        };

        let (last_refresh, last_refresh_ms) = datetime::now_pair();
        let mut updated = entry.clone();
        updated.last_refresh = Some(last_refresh.clone());
        updated.last_refresh_ms = Some(last_refresh_ms);
        *entry = updated;

        self.ctx.content_store.set(entry_id, content).await?;
        self.ctx.entry_repository.save_all(&list).await?;

        Ok(RefreshData {
            last_refresh,
            last_refresh_ms,
        })
    }

    /// Refresh every remote entry whose interval has elapsed.
    ///
    /// Fetches run concurrently; commits serialize through the write lock.
    /// Entries already in flight are skipped and counted, not queued.
    pub async fn refresh_due(&self) -> CoreResult<RefreshSweepResult> {
        let list = self.ctx.entry_repository.find_all().await?;
        let now_ms = datetime::now_millis();
        let due: Vec<String> = tree::flatten(&list)
            .into_iter()
            .filter(|e| e.is_refresh_due(now_ms))
            .map(|e| e.id.clone())
            .collect();
        drop(list);

        let refreshes = due.into_iter().map(|id| async move {
            let result = self.refresh(&id).await;
            (id, result)
        });
        let results = futures::future::join_all(refreshes).await;

        let mut sweep = RefreshSweepResult::default();
        for (id, result) in results {
            match result {
                Ok(_) => sweep.success_count += 1,
                Err(CoreError::RefreshBusy(_)) => {
                    log::debug!("scheduled refresh skipped, {id} already in flight");
                    sweep.busy_count += 1;
                }
                Err(e) => {
                    log::warn!("scheduled refresh of {id} failed: {e}");
                    sweep.error_count += 1;
                }
            }
        }
        Ok(sweep)
    }
}
