//! Port definition for cover loading.

use async_trait::async_trait;

use crate::domain::entities::{CoverDescriptor, LoadedCover};
use crate::domain::errors::CoverResult;

/// Port for loading covers, checking the cache before the network.
#[async_trait]
pub trait CoverCachePort: Send + Sync {
    /// Loads the cover described by `descriptor`.
    async fn load(&self, descriptor: &CoverDescriptor) -> CoverResult<LoadedCover>;
}
