//! Port definition for fetching remote images.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::CoverResult;

/// Port for downloading raw image bytes.
/// Implementations must be thread-safe.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads the body at `url`.
    ///
    /// Any transport failure or non-success response is a `CoverError::Fetch`.
    async fn fetch(&self, url: &str) -> CoverResult<Bytes>;
}
