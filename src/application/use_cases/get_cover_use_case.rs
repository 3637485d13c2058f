//! Cover retrieval use case.

use std::sync::Arc;

use tracing::debug;

use crate::application::dto::{CoverRequest, CoverResponse, PreferenceSource};
use crate::application::services::CoverResolver;
use crate::domain::entities::{CoverDescriptor, RegionPreference};
use crate::domain::errors::CoverResult;
use crate::domain::ports::{CoverCachePort, ProfileStorePort};

/// Resolves a request into a descriptor and loads the cover.
pub struct GetCoverUseCase {
    resolver: CoverResolver,
    covers: Arc<dyn CoverCachePort>,
    profiles: Arc<dyn ProfileStorePort>,
}

impl GetCoverUseCase {
    /// Creates new use case.
    #[must_use]
    pub fn new(covers: Arc<dyn CoverCachePort>, profiles: Arc<dyn ProfileStorePort>) -> Self {
        Self {
            resolver: CoverResolver::new(),
            covers,
            profiles,
        }
    }

    /// Resolves the descriptor for a request without loading anything.
    ///
    /// Preference priority:
    /// 1. Region given in the request
    /// 2. `coverregion` stored in the user's profile
    ///
    /// A profile that cannot be read counts as having no preference.
    pub async fn describe(&self, request: &CoverRequest) -> (CoverDescriptor, PreferenceSource) {
        let (preference, source) = self.preference(request).await;
        let descriptor = match request.kind {
            Some(kind) => self
                .resolver
                .resolve_as(&request.game, preference.as_ref(), kind),
            None => self.resolver.resolve(&request.game, preference.as_ref()),
        };
        (descriptor, source)
    }

    /// Resolves and loads the cover.
    ///
    /// # Errors
    /// Returns error if the cover is not cached and cannot be downloaded and
    /// stored, or if the cached entry cannot be read.
    pub async fn execute(&self, request: &CoverRequest) -> CoverResult<CoverResponse> {
        let (descriptor, preference_source) = self.describe(request).await;
        debug!(
            game = %request.game,
            key = %descriptor.cache_key(),
            preference = %preference_source,
            "Resolved cover"
        );

        let cover = self.covers.load(&descriptor).await?;

        Ok(CoverResponse {
            descriptor,
            cover,
            preference_source,
        })
    }

    async fn preference(
        &self,
        request: &CoverRequest,
    ) -> (Option<RegionPreference>, PreferenceSource) {
        if let Some(region) = &request.region {
            return (Some(region.clone()), PreferenceSource::Request);
        }

        let Some(user_id) = &request.user_id else {
            return (None, PreferenceSource::None);
        };

        match self.profiles.cover_region(user_id).await {
            Ok(Some(region)) => (
                Some(RegionPreference::new(region)),
                PreferenceSource::Profile,
            ),
            Ok(None) => {
                debug!(user_id = %user_id, "No cover region in profile");
                (None, PreferenceSource::None)
            }
            Err(e) => {
                debug!(user_id = %user_id, error = %e, "Failed to read profile");
                (None, PreferenceSource::None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CoverKind, CoverSource};
    use crate::domain::ports::ImageFetchPort;
    use crate::domain::ports::mocks::{MockImageFetcher, MockProfileStore};
    use crate::infrastructure::image::{CoverCache, CoverCacheConfig};
    use tempfile::TempDir;

    struct Fixture {
        use_case: GetCoverUseCase,
        fetcher: Arc<MockImageFetcher>,
        _temp: TempDir,
    }

    fn fixture(profiles: MockProfileStore) -> Fixture {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(MockImageFetcher::serving_png(64, 64));
        let fetch_port: Arc<dyn ImageFetchPort> = fetcher.clone();
        let cache = CoverCache::new(CoverCacheConfig::new(temp.path()), fetch_port);
        Fixture {
            use_case: GetCoverUseCase::new(Arc::new(cache), Arc::new(profiles)),
            fetcher,
            _temp: temp,
        }
    }

    #[tokio::test]
    async fn test_profile_region_applies_to_pal_code() {
        let f = fixture(MockProfileStore::with_cover_region("42", "fr"));

        let response = f
            .use_case
            .execute(&CoverRequest::new("RMCP01").for_user("42"))
            .await
            .unwrap();

        assert_eq!(response.descriptor.region().as_str(), "FR");
        assert_eq!(response.preference_source, PreferenceSource::Profile);
        assert_eq!(response.cover.source, CoverSource::Network);
        assert!(f.fetcher.urls()[0].contains("/wii/cover3D/FR/RMCP01.png"));
    }

    #[tokio::test]
    async fn test_request_region_beats_profile() {
        let f = fixture(MockProfileStore::with_cover_region("42", "fr"));

        let (descriptor, source) = f
            .use_case
            .describe(&CoverRequest::new("RMCP01").for_user("42").with_region("de"))
            .await;

        assert_eq!(descriptor.region().as_str(), "DE");
        assert_eq!(source, PreferenceSource::Request);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_preference() {
        let f = fixture(MockProfileStore::new());

        let (descriptor, source) = f
            .use_case
            .describe(&CoverRequest::new("RMCP01").for_user("404"))
            .await;

        assert_eq!(descriptor.region().as_str(), "US");
        assert_eq!(source, PreferenceSource::None);
    }

    #[tokio::test]
    async fn test_invalid_stored_region_is_ignored() {
        let f = fixture(MockProfileStore::with_cover_region("42", "france"));

        let (descriptor, source) = f
            .use_case
            .describe(&CoverRequest::new("RMCP01").for_user("42"))
            .await;

        assert_eq!(descriptor.region().as_str(), "US");
        assert_eq!(source, PreferenceSource::Profile);
    }

    #[tokio::test]
    async fn test_explicit_kind() {
        let f = fixture(MockProfileStore::new());

        let response = f
            .use_case
            .execute(&CoverRequest::new("ARPE01").with_kind(CoverKind::Cover))
            .await
            .unwrap();

        assert_eq!(response.descriptor.kind(), CoverKind::Cover);
        assert!(f.fetcher.urls()[0].ends_with("/wiiu/cover/US/ARPE01.jpg"));
    }

    #[tokio::test]
    async fn test_repeat_request_served_from_cache() {
        let f = fixture(MockProfileStore::new());
        let request = CoverRequest::new("RMCE01");

        f.use_case.execute(&request).await.unwrap();
        let second = f.use_case.execute(&request).await.unwrap();

        assert_eq!(second.cover.source, CoverSource::DiskCache);
        assert_eq!(f.fetcher.calls(), 1);
    }
}
