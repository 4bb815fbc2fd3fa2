//! Platform-agnostic application bootstrap for Hostweave.
//!
//! Provides `AppState` (service container) and `AppStateBuilder` (adapter
//! injection). Every frontend constructs this once at startup, injects its
//! storage adapters, and calls the services.

pub mod adapters;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hostweave_core::error::{CoreError, CoreResult};
use hostweave_core::fetch::HttpFetcher;
use hostweave_core::services::{EntryService, HistoryService, RefreshService, ServiceContext};
use hostweave_core::traits::{ContentStore, EntryRepository, RemoteFetcher, SnapshotRepository};

/// Platform-agnostic application state.
///
/// Holds all services and the `ServiceContext`.
pub struct AppState {
    /// Service context (holds all storage adapters)
    pub ctx: Arc<ServiceContext>,
    /// Entry service
    pub entry_service: Arc<EntryService>,
    /// Refresh service
    pub refresh_service: Arc<RefreshService>,
    /// History service
    pub history_service: Arc<HistoryService>,
    /// Whether the startup sequence has completed
    pub startup_completed: AtomicBool,
}

impl AppState {
    /// Run the startup sequence: an initial sweep of overdue remote entries.
    ///
    /// Sweep failures are logged, never fatal; the app starts regardless.
    /// Sets `startup_completed` when done.
    pub async fn run_startup(&self) {
        match self.refresh_service.refresh_due().await {
            Ok(sweep) => {
                log::info!(
                    "startup refresh sweep complete: {} refreshed, {} failed, {} busy",
                    sweep.success_count,
                    sweep.error_count,
                    sweep.busy_count
                );
            }
            Err(e) => {
                log::error!("startup refresh sweep failed: {e}");
            }
        }
        self.startup_completed.store(true, Ordering::SeqCst);
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `entry_repository` — how the entry list is stored
/// - `snapshot_repository` — how history snapshots are stored
/// - `content_store` — how per-entry content is stored
///
/// # Optional
/// - `fetcher` — defaults to [`HttpFetcher`]
pub struct AppStateBuilder {
    entry_repository: Option<Arc<dyn EntryRepository>>,
    snapshot_repository: Option<Arc<dyn SnapshotRepository>>,
    content_store: Option<Arc<dyn ContentStore>>,
    fetcher: Option<Arc<dyn RemoteFetcher>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entry_repository: None,
            snapshot_repository: None,
            content_store: None,
            fetcher: None,
        }
    }

    #[must_use]
    pub fn entry_repository(mut self, repo: Arc<dyn EntryRepository>) -> Self {
        self.entry_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn snapshot_repository(mut self, repo: Arc<dyn SnapshotRepository>) -> Self {
        self.snapshot_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn content_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.content_store = Some(store);
        self
    }

    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        let entry_repository = self.entry_repository.ok_or_else(|| {
            CoreError::ValidationError("entry_repository is required".to_string())
        })?;
        let snapshot_repository = self.snapshot_repository.ok_or_else(|| {
            CoreError::ValidationError("snapshot_repository is required".to_string())
        })?;
        let content_store = self
            .content_store
            .ok_or_else(|| CoreError::ValidationError("content_store is required".to_string()))?;
        let fetcher = self
            .fetcher
            .unwrap_or_else(|| Arc::new(HttpFetcher::new()));

        let ctx = Arc::new(ServiceContext::new(
            entry_repository,
            snapshot_repository,
            content_store,
            fetcher,
        ));

        let entry_service = Arc::new(EntryService::new(Arc::clone(&ctx)));
        let history_service = Arc::new(HistoryService::new(Arc::clone(&ctx)));
        let refresh_service = Arc::new(RefreshService::new(
            Arc::clone(&ctx),
            Arc::clone(&history_service),
        ));

        Ok(AppState {
            ctx,
            entry_service,
            refresh_service,
            history_service,
            startup_completed: AtomicBool::new(false),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
