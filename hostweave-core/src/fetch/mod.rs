//! HTTP implementation of [`RemoteFetcher`].
//!
//! One GET per refresh, bounded by a per-request timeout. Error taxonomy:
//! timeouts map to `FetchTimeout`, everything else (connect errors, non-2xx
//! status, unreadable body) to `FetchFailed`. No retry here: scheduled
//! refreshes come around again on their own interval.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::traits::RemoteFetcher;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `reqwest`-backed remote fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom per-request timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::default(),
            timeout,
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> CoreResult<String> {
        log::debug!("[fetch] GET {url}");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::FetchTimeout {
                        url: url.to_string(),
                    }
                } else {
                    CoreError::FetchFailed {
                        url: url.to_string(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        log::debug!("[fetch] {url} -> {status}");

        if !status.is_success() {
            return Err(CoreError::FetchFailed {
                url: url.to_string(),
                detail: format!("HTTP {status}"),
            });
        }

        response.text().await.map_err(|e| CoreError::FetchFailed {
            url: url.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })
    }
}
