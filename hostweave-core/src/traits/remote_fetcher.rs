//! Remote content fetch abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;

/// Remote fetch Trait
///
/// Abstracts the network so the refresh engine can be tested without one.
/// The production implementation is [`crate::fetch::HttpFetcher`].
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetch the content behind `url`.
    ///
    /// # Arguments
    /// * `url` - source URL of a remote entry
    async fn fetch(&self, url: &str) -> CoreResult<String>;
}
