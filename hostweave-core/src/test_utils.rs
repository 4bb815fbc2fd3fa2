//! Test helper module
//!
//! Provides mock implementations and convenient test factory methods.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Notify, RwLock};

use crate::error::{CoreError, CoreResult};
use crate::services::{EntryService, HistoryService, RefreshService, ServiceContext};
use crate::traits::{ContentStore, EntryRepository, RemoteFetcher, SnapshotRepository};
use crate::types::{EntryKind, HistorySnapshot, HostsEntry};

// ===== MockEntryRepository =====

pub struct MockEntryRepository {
    entries: RwLock<Vec<HostsEntry>>,
    /// If Some, `save_all` returns this error (for testing failure paths)
    save_error: RwLock<Option<String>>,
}

impl MockEntryRepository {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            save_error: RwLock::new(None),
        }
    }

    pub async fn set_save_error(&self, err: Option<String>) {
        *self.save_error.write().await = err;
    }
}

#[async_trait]
impl EntryRepository for MockEntryRepository {
    async fn find_all(&self) -> CoreResult<Vec<HostsEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn save_all(&self, entries: &[HostsEntry]) -> CoreResult<()> {
        if let Some(ref msg) = *self.save_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        *self.entries.write().await = entries.to_vec();
        Ok(())
    }
}

// ===== MockSnapshotRepository =====

pub struct MockSnapshotRepository {
    snapshots: RwLock<Vec<HistorySnapshot>>,
}

impl MockSnapshotRepository {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SnapshotRepository for MockSnapshotRepository {
    async fn find_all(&self) -> CoreResult<Vec<HistorySnapshot>> {
        Ok(self.snapshots.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<HistorySnapshot>> {
        Ok(self
            .snapshots
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn append(&self, snapshot: &HistorySnapshot) -> CoreResult<()> {
        self.snapshots.write().await.push(snapshot.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.snapshots.write().await.retain(|s| s.id != id);
        Ok(())
    }
}

// ===== MockContentStore =====

pub struct MockContentStore {
    contents: RwLock<HashMap<String, String>>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self {
            contents: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn get(&self, entry_id: &str) -> CoreResult<Option<String>> {
        Ok(self.contents.read().await.get(entry_id).cloned())
    }

    async fn set(&self, entry_id: &str, content: &str) -> CoreResult<()> {
        self.contents
            .write()
            .await
            .insert(entry_id.to_string(), content.to_string());
        Ok(())
    }

    async fn remove(&self, entry_id: &str) -> CoreResult<()> {
        self.contents.write().await.remove(entry_id);
        Ok(())
    }
}

// ===== MockRemoteFetcher =====

/// Scriptable fetcher.
///
/// Returns the configured content or failure. An optional gate lets a test
/// hold a fetch open: `fetch` signals `wait_for_fetch` on entry, then parks
/// until the gate is notified.
pub struct MockRemoteFetcher {
    content: RwLock<String>,
    fail_with: RwLock<Option<String>>,
    gate: RwLock<Option<Arc<Notify>>>,
    entered: Notify,
    calls: AtomicUsize,
}

impl MockRemoteFetcher {
    pub fn new() -> Self {
        Self {
            content: RwLock::new(String::new()),
            fail_with: RwLock::new(None),
            gate: RwLock::new(None),
            entered: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_content(&self, content: &str) {
        *self.content.write().await = content.to_string();
        *self.fail_with.write().await = None;
    }

    pub async fn set_failure(&self, detail: Option<&str>) {
        *self.fail_with.write().await = detail.map(String::from);
    }

    pub async fn set_gate(&self, gate: Option<Arc<Notify>>) {
        *self.gate.write().await = gate;
    }

    /// Wait until a fetch has entered the mock.
    pub async fn wait_for_fetch(&self) {
        self.entered.notified().await;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteFetcher for MockRemoteFetcher {
    async fn fetch(&self, url: &str) -> CoreResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();

        let gate = self.gate.read().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(detail) = self.fail_with.read().await.clone() {
            return Err(CoreError::FetchFailed {
                url: url.to_string(),
                detail,
            });
        }
        Ok(self.content.read().await.clone())
    }
}

// ===== Entry/snapshot factories =====

/// Create a bare entry of the given kind.
pub fn make_entry(id: &str, kind: EntryKind) -> HostsEntry {
    HostsEntry::new(id.to_string(), kind)
}

/// Create a remote entry with a URL.
pub fn make_remote_entry(id: &str, url: &str) -> HostsEntry {
    let mut entry = make_entry(id, EntryKind::Remote);
    entry.url = Some(url.to_string());
    entry
}

/// Create a snapshot with a fixed timestamp.
pub fn make_snapshot(id: &str, add_time_ms: i64, content: &str) -> HistorySnapshot {
    HistorySnapshot {
        id: id.to_string(),
        add_time_ms,
        content: content.to_string(),
    }
}

// ===== Context factories =====

/// Create a test `ServiceContext` with all mocks.
pub fn create_test_context() -> (
    Arc<ServiceContext>,
    Arc<MockEntryRepository>,
    Arc<MockContentStore>,
    Arc<MockSnapshotRepository>,
    Arc<MockRemoteFetcher>,
) {
    let entry_repo = Arc::new(MockEntryRepository::new());
    let content_store = Arc::new(MockContentStore::new());
    let snapshot_repo = Arc::new(MockSnapshotRepository::new());
    let fetcher = Arc::new(MockRemoteFetcher::new());

    let ctx = Arc::new(ServiceContext::new(
        entry_repo.clone(),
        snapshot_repo.clone(),
        content_store.clone(),
        fetcher.clone(),
    ));

    (ctx, entry_repo, content_store, snapshot_repo, fetcher)
}

/// Create a test `EntryService`.
pub fn create_test_entry_service() -> (
    EntryService,
    Arc<MockEntryRepository>,
    Arc<MockContentStore>,
    Arc<MockRemoteFetcher>,
) {
    let (ctx, entry_repo, content_store, _, fetcher) = create_test_context();
    (EntryService::new(ctx), entry_repo, content_store, fetcher)
}

/// Create a test `HistoryService`.
pub fn create_test_history_service() -> (HistoryService, Arc<MockSnapshotRepository>) {
    let (ctx, _, _, snapshot_repo, _) = create_test_context();
    (HistoryService::new(ctx), snapshot_repo)
}

/// Create a test `RefreshService` (with its history service attached).
pub fn create_test_refresh_service() -> (
    Arc<RefreshService>,
    Arc<MockEntryRepository>,
    Arc<MockContentStore>,
    Arc<MockSnapshotRepository>,
    Arc<MockRemoteFetcher>,
) {
    let (ctx, entry_repo, content_store, snapshot_repo, fetcher) = create_test_context();
    let history = Arc::new(HistoryService::new(Arc::clone(&ctx)));
    let service = Arc::new(RefreshService::new(ctx, history));
    (service, entry_repo, content_store, snapshot_repo, fetcher)
}
