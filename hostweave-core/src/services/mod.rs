//! Business logic service layer

mod entry_service;
mod history_service;
mod refresh_service;

pub use entry_service::EntryService;
pub use history_service::HistoryService;
pub use refresh_service::{RefreshService, RefreshSweepResult};

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::traits::{ContentStore, EntryRepository, RemoteFetcher, SnapshotRepository};

/// Service context - holds all dependencies
///
/// The platform layer creates this context and injects platform-specific
/// storage implementations.
pub struct ServiceContext {
    /// Entry list repository
    pub entry_repository: Arc<dyn EntryRepository>,
    /// History snapshot repository
    pub snapshot_repository: Arc<dyn SnapshotRepository>,
    /// Per-entry content store
    pub content_store: Arc<dyn ContentStore>,
    /// Remote fetcher
    pub fetcher: Arc<dyn RemoteFetcher>,
    /// Serializes read-modify-write cycles on the entry list. The list is
    /// persisted as one document, so concurrent merges would lose updates
    /// without it.
    pub(crate) entry_write_lock: Mutex<()>,
}

impl ServiceContext {
    /// Create a service context
    #[must_use]
    pub fn new(
        entry_repository: Arc<dyn EntryRepository>,
        snapshot_repository: Arc<dyn SnapshotRepository>,
        content_store: Arc<dyn ContentStore>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        Self {
            entry_repository,
            snapshot_repository,
            content_store,
            fetcher,
            entry_write_lock: Mutex::new(()),
        }
    }
}
