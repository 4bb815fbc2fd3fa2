//! Entry persistence abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::HostsEntry;

/// Entry list repository Trait
///
/// The repository persists the whole nested entry list as one document.
/// `save_all` replaces it atomically: a concurrent reader sees either the old
/// list or the new one, never a partially merged record.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Load the full entry list
    async fn find_all(&self) -> CoreResult<Vec<HostsEntry>>;

    /// Atomically replace the full entry list
    ///
    /// # Arguments
    /// * `entries` - the new list
    async fn save_all(&self, entries: &[HostsEntry]) -> CoreResult<()>;
}
