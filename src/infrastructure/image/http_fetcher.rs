//! HTTP image transport.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::errors::{CoverError, CoverResult};
use crate::domain::ports::ImageFetchPort;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches images over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher whose requests expire after `timeout`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> CoverResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoverError::fetch(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Creates a fetcher with the default timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_defaults() -> CoverResult<Self> {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> CoverResult<Bytes> {
        debug!(url = %url, "Requesting image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoverError::fetch(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoverError::fetch(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoverError::fetch(format!("Failed to read body: {e}")))?;

        debug!(url = %url, size = bytes.len(), "Image downloaded");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        assert!(HttpImageFetcher::with_defaults().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let fetcher = HttpImageFetcher::new(Duration::from_millis(500)).unwrap();
        let err = fetcher
            .fetch("http://127.0.0.1:9/cover.png")
            .await
            .unwrap_err();
        assert!(err.is_network_error());
    }
}
