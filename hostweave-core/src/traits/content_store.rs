//! Entry content storage abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;

/// Per-entry content store Trait
///
/// Holds the raw hosts text of local and remote entries, keyed by entry id.
/// Group and folder entries have no stored content of their own; theirs is
/// resolved from members.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Get the stored content for an entry
    ///
    /// # Arguments
    /// * `entry_id` - Entry ID
    async fn get(&self, entry_id: &str) -> CoreResult<Option<String>>;

    /// Store content for an entry, replacing any previous value
    ///
    /// # Arguments
    /// * `entry_id` - Entry ID
    /// * `content` - hosts text
    async fn set(&self, entry_id: &str, content: &str) -> CoreResult<()>;

    /// Remove stored content for an entry (no-op when absent)
    ///
    /// # Arguments
    /// * `entry_id` - Entry ID
    async fn remove(&self, entry_id: &str) -> CoreResult<()>;
}
