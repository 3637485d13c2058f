//! User avatar cache.

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use tracing::debug;

use crate::domain::entities::Dimensions;
use crate::domain::errors::{CoverError, CoverResult};
use crate::domain::ports::ImageFetchPort;

use super::art_urls::{AVATAR_REQUEST_SIZE, avatar_url};
use super::raster;

/// Size avatars are normalized to.
pub const AVATAR_DIMENSIONS: Dimensions = Dimensions::new(AVATAR_REQUEST_SIZE, AVATAR_REQUEST_SIZE);

/// Stores one normalized avatar per user at `<dir>/<user_id>.png`.
///
/// Unlike covers, avatars change over time, so `refresh` always downloads and
/// replaces the stored copy.
pub struct AvatarCache {
    avatar_dir: PathBuf,
    base_url: String,
    fetcher: Arc<dyn ImageFetchPort>,
}

impl std::fmt::Debug for AvatarCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarCache")
            .field("avatar_dir", &self.avatar_dir)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AvatarCache {
    /// Creates an avatar cache.
    #[must_use]
    pub fn new(
        avatar_dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
        fetcher: Arc<dyn ImageFetchPort>,
    ) -> Self {
        Self {
            avatar_dir: avatar_dir.into(),
            base_url: base_url.into(),
            fetcher,
        }
    }

    /// Returns the file an avatar is stored in.
    ///
    /// # Errors
    /// Returns `CoverError::InvalidCacheKey` unless the id is non-empty ASCII
    /// alphanumeric.
    pub fn avatar_path(&self, user_id: &str) -> CoverResult<PathBuf> {
        if user_id.is_empty() || !user_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoverError::InvalidCacheKey(user_id.to_string()));
        }
        Ok(self.avatar_dir.join(format!("{user_id}.png")))
    }

    /// Downloads the avatar identified by `avatar_hash` and stores it.
    ///
    /// # Errors
    /// Returns error if the download, decode or write fails. A failed refresh
    /// leaves any previously stored avatar untouched.
    pub async fn refresh(
        &self,
        user_id: &str,
        avatar_hash: &str,
    ) -> CoverResult<Arc<DynamicImage>> {
        let path = self.avatar_path(user_id)?;
        let url = avatar_url(&self.base_url, user_id, avatar_hash);
        debug!(user_id = %user_id, url = %url, "Downloading avatar");

        let bytes = self.fetcher.fetch(&url).await?;
        let img = Arc::new(raster::normalize(bytes, AVATAR_DIMENSIONS).await?);
        raster::write_png(&path, Arc::clone(&img)).await?;

        Ok(img)
    }

    /// Loads a stored avatar.
    ///
    /// # Errors
    /// Returns error if the stored file cannot be read or decoded.
    pub async fn cached(&self, user_id: &str) -> CoverResult<Option<Arc<DynamicImage>>> {
        let path = self.avatar_path(user_id)?;
        Ok(raster::read_existing(&path).await?.map(Arc::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockImageFetcher;
    use image::GenericImageView;
    use tempfile::TempDir;

    fn create_cache(fetcher: &Arc<MockImageFetcher>) -> (AvatarCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let fetcher: Arc<dyn ImageFetchPort> = fetcher.clone();
        let cache = AvatarCache::new(
            temp_dir.path().join("avatars"),
            "https://cdn.test",
            fetcher,
        );
        (cache, temp_dir)
    }

    #[tokio::test]
    async fn test_refresh_stores_normalized_avatar() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(128, 128));
        let (cache, _temp) = create_cache(&fetcher);

        let img = cache.refresh("1234", "abcd").await.unwrap();

        assert_eq!(img.dimensions(), (512, 512));
        assert_eq!(
            fetcher.urls(),
            vec!["https://cdn.test/avatars/1234/abcd.jpg?size=512".to_string()]
        );
        let stored = cache.cached("1234").await.unwrap().unwrap();
        assert_eq!(stored.dimensions(), (512, 512));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_avatar() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(16, 16));
        let (cache, _temp) = create_cache(&fetcher);
        cache.refresh("1234", "old").await.unwrap();

        fetcher.set_failing();
        assert!(cache.refresh("1234", "new").await.is_err());

        assert!(cache.cached("1234").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_avatar() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(16, 16));
        let (cache, _temp) = create_cache(&fetcher);
        assert!(cache.cached("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(16, 16));
        let (cache, _temp) = create_cache(&fetcher);

        assert!(cache.refresh("../x", "abcd").await.is_err());
        assert!(cache.avatar_path("").is_err());
        assert_eq!(fetcher.calls(), 0);
    }
}
