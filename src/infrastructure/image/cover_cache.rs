//! Lazy fetch-and-cache of normalized cover images.
//!
//! A cover is downloaded at most once per cache key: the first request that
//! misses fetches, resizes and writes `<cache_key>.png`; later requests decode
//! that file. Entries are never rewritten or evicted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::domain::entities::{CacheKey, CoverDescriptor, CoverSource, LoadedCover};
use crate::domain::errors::{CoverError, CoverResult};
use crate::domain::ports::{CoverCachePort, ImageFetchPort};

use super::art_urls::{DEFAULT_ART_BASE_URL, cover_url};
use super::raster;

/// Configuration for the cover cache.
#[derive(Debug, Clone)]
pub struct CoverCacheConfig {
    /// Directory holding cache entries.
    pub cache_dir: PathBuf,
    /// Base URL of the artwork host.
    pub art_base_url: String,
    /// Collapse concurrent misses for one key into a single download.
    pub coalesce_in_flight: bool,
}

impl CoverCacheConfig {
    /// Creates a configuration for `cache_dir` with default settings.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            art_base_url: DEFAULT_ART_BASE_URL.to_string(),
            coalesce_in_flight: true,
        }
    }

    /// Sets the artwork host.
    #[must_use]
    pub fn with_art_base_url(mut self, url: impl Into<String>) -> Self {
        self.art_base_url = url.into();
        self
    }

    /// Enables or disables in-flight coalescing.
    #[must_use]
    pub const fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce_in_flight = enabled;
        self
    }
}

/// Outcome of one download, shared by every request that joined it.
type Flight = OnceCell<CoverResult<LoadedCover>>;

type FlightMap = HashMap<CacheKey, FlightEntry>;

struct FlightEntry {
    flight: Arc<Flight>,
    waiters: usize,
}

/// One request's membership in a flight. Dropping it, on completion or
/// cancellation, removes the flight once it has settled or has no waiters
/// left.
struct FlightGuard<'a> {
    flights: &'a Mutex<FlightMap>,
    key: CacheKey,
    flight: Arc<Flight>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut flights = self.flights.lock();
        let Some(entry) = flights.get_mut(&self.key) else {
            return;
        };
        if !Arc::ptr_eq(&entry.flight, &self.flight) {
            return;
        }
        entry.waiters = entry.waiters.saturating_sub(1);
        if entry.waiters == 0 || self.flight.initialized() {
            flights.remove(&self.key);
        }
    }
}

/// Disk-backed cover cache.
pub struct CoverCache {
    config: CoverCacheConfig,
    fetcher: Arc<dyn ImageFetchPort>,
    in_flight: Mutex<FlightMap>,
}

impl std::fmt::Debug for CoverCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverCache")
            .field("config", &self.config)
            .field("in_flight", &self.in_flight.lock().len())
            .finish_non_exhaustive()
    }
}

impl CoverCache {
    /// Creates a cache that downloads through `fetcher`.
    #[must_use]
    pub fn new(config: CoverCacheConfig, fetcher: Arc<dyn ImageFetchPort>) -> Self {
        Self {
            config,
            fetcher,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.config.cache_dir
    }

    /// Returns the path of the entry for `key`.
    ///
    /// # Errors
    /// Returns `CoverError::InvalidCacheKey` if the key could escape the cache
    /// directory.
    pub fn entry_path(&self, key: &CacheKey) -> CoverResult<PathBuf> {
        if !key.is_path_safe() {
            return Err(CoverError::InvalidCacheKey(key.to_string()));
        }
        Ok(self.config.cache_dir.join(key.file_name()))
    }

    /// Checks if a cover is cached.
    pub async fn contains(&self, descriptor: &CoverDescriptor) -> bool {
        match self.entry_path(descriptor.cache_key()) {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Number of downloads currently in progress.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Loads a cover, downloading and caching it on a miss.
    ///
    /// A cache hit never touches the network. A miss returns the freshly
    /// resized image itself rather than re-reading the written file.
    ///
    /// # Errors
    /// Returns `CoverError::Fetch` or `CoverError::Decode` if the download
    /// fails, in which case nothing is written; `CoverError::Io` if the entry
    /// cannot be read or written; `CoverError::Decode` for a corrupt entry.
    pub async fn get(&self, descriptor: &CoverDescriptor) -> CoverResult<LoadedCover> {
        let key = descriptor.cache_key();
        let path = self.entry_path(key)?;

        if let Some(cover) = self.load_cached(key, &path).await? {
            return Ok(cover);
        }

        if !self.config.coalesce_in_flight {
            return self.download(descriptor, &path).await;
        }

        let guard = self.join_flight(key);
        guard
            .flight
            .get_or_init(|| self.fill(descriptor, &path))
            .await
            .clone()
    }

    async fn load_cached(
        &self,
        key: &CacheKey,
        path: &Path,
    ) -> CoverResult<Option<LoadedCover>> {
        let Some(img) = raster::read_existing(path).await? else {
            trace!(key = %key, "Cover cache miss");
            return Ok(None);
        };

        trace!(key = %key, "Cover cache hit");
        Ok(Some(LoadedCover {
            key: key.clone(),
            image: Arc::new(img),
            source: CoverSource::DiskCache,
        }))
    }

    /// Runs once per flight. The entry may have been written by a flight
    /// that finished after this request's own miss.
    async fn fill(&self, descriptor: &CoverDescriptor, path: &Path) -> CoverResult<LoadedCover> {
        if let Some(cover) = self.load_cached(descriptor.cache_key(), path).await? {
            return Ok(cover);
        }
        self.download(descriptor, path).await
    }

    async fn download(
        &self,
        descriptor: &CoverDescriptor,
        path: &Path,
    ) -> CoverResult<LoadedCover> {
        let key = descriptor.cache_key();
        let url = cover_url(&self.config.art_base_url, descriptor);
        debug!(key = %key, url = %url, "Downloading cover");

        let bytes = self.fetcher.fetch(&url).await?;
        let img = Arc::new(raster::normalize(bytes, descriptor.dimensions()).await?);
        raster::write_png(path, Arc::clone(&img)).await?;

        debug!(key = %key, dimensions = %descriptor.dimensions(), "Cover cached");
        Ok(LoadedCover {
            key: key.clone(),
            image: img,
            source: CoverSource::Network,
        })
    }

    fn join_flight(&self, key: &CacheKey) -> FlightGuard<'_> {
        let mut flights = self.in_flight.lock();
        let entry = flights.entry(key.clone()).or_insert_with(|| FlightEntry {
            flight: Arc::new(Flight::new()),
            waiters: 0,
        });
        if entry.waiters > 0 {
            trace!(key = %key, "Joining in-flight download");
        }
        entry.waiters += 1;

        FlightGuard {
            flights: &self.in_flight,
            key: key.clone(),
            flight: Arc::clone(&entry.flight),
        }
    }
}

#[async_trait::async_trait]
impl CoverCachePort for CoverCache {
    async fn load(&self, descriptor: &CoverDescriptor) -> CoverResult<LoadedCover> {
        self.get(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::CoverResolver;
    use crate::domain::entities::{CoverKind, GameId};
    use crate::domain::ports::mocks::MockImageFetcher;
    use image::GenericImageView;
    use std::time::Duration;
    use tempfile::TempDir;

    fn descriptor(raw: &str) -> CoverDescriptor {
        CoverResolver::new().resolve(&GameId::parse(raw), None)
    }

    fn create_cache(fetcher: &Arc<MockImageFetcher>, coalesce: bool) -> (CoverCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = CoverCacheConfig::new(temp_dir.path().join("covers"))
            .with_art_base_url("https://art.test")
            .with_coalescing(coalesce);
        let fetcher: Arc<dyn ImageFetchPort> = fetcher.clone();
        (CoverCache::new(config, fetcher), temp_dir)
    }

    #[tokio::test]
    async fn test_miss_downloads_and_persists() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(640, 480));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        let cover = cache.get(&d).await.unwrap();

        assert_eq!(cover.source, CoverSource::Network);
        assert_eq!(cover.image.dimensions(), (176, 248));
        assert_eq!(
            fetcher.urls(),
            vec!["https://art.test/wii/cover3D/US/RMCE01.png".to_string()]
        );

        let path = cache.entry_path(d.cache_key()).unwrap();
        assert!(path.ends_with("wii-cover3D-RMCE01-US.png"));
        let stored = image::open(&path).unwrap();
        assert_eq!(stored.dimensions(), (176, 248));
    }

    #[tokio::test]
    async fn test_second_get_hits_disk() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(300, 300));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        let first = cache.get(&d).await.unwrap();
        let second = cache.get(&d).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(second.source, CoverSource::DiskCache);
        assert_eq!(first.image.to_rgba8(), second.image.to_rgba8());
    }

    #[tokio::test]
    async fn test_hit_does_not_touch_network() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(10, 10));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        cache.get(&d).await.unwrap();
        fetcher.set_failing();

        assert!(cache.get(&d).await.is_ok());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let fetcher = Arc::new(MockImageFetcher::failing());
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        let err = cache.get(&d).await.unwrap_err();

        assert!(err.is_network_error());
        assert!(!cache.entry_path(d.cache_key()).unwrap().exists());
        assert!(!cache.contains(&d).await);
        assert_eq!(cache.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_body_writes_nothing() {
        let fetcher = Arc::new(MockImageFetcher::serving(&b"<html>not found</html>"[..]));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        let err = cache.get(&d).await.unwrap_err();

        assert!(matches!(err, CoverError::Decode(_)));
        assert!(!cache.entry_path(d.cache_key()).unwrap().exists());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let fetcher = Arc::new(MockImageFetcher::failing());
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        assert!(cache.get(&d).await.is_err());
        assert!(cache.get(&d).await.is_err());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_reported() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(10, 10));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");
        let path = cache.entry_path(d.cache_key()).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"garbage").unwrap();

        let err = cache.get(&d).await.unwrap_err();

        assert!(matches!(err, CoverError::Decode(_)));
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(std::fs::read(&path).unwrap(), b"garbage");
    }

    #[tokio::test]
    async fn test_unwritable_cache_dir_is_io_error() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(10, 10));
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("covers");
        std::fs::write(&blocker, b"a file, not a directory").unwrap();
        let fetcher_port: Arc<dyn ImageFetchPort> = fetcher.clone();
        let cache = CoverCache::new(CoverCacheConfig::new(&blocker), fetcher_port);

        let err = cache.get(&descriptor("RMCE01")).await.unwrap_err();

        assert!(matches!(err, CoverError::Io(_)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_sizes_follow_descriptor() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(37, 900));
        let (cache, _temp) = create_cache(&fetcher, true);
        let resolver = CoverResolver::new();

        let disc = resolver.resolve_as(&"RMCE01".into(), None, CoverKind::Disc);
        let flat = resolver.resolve_as(&"ds-E01".into(), None, CoverKind::Cover);

        for d in [disc, flat] {
            cache.get(&d).await.unwrap();
            let stored = image::open(cache.entry_path(d.cache_key()).unwrap()).unwrap();
            assert_eq!(
                stored.dimensions(),
                (d.dimensions().width, d.dimensions().height)
            );
        }
        assert!(fetcher.urls()[1].ends_with("/ds/cover/US/ds-E01.jpg"));
    }

    #[tokio::test]
    async fn test_unsafe_key_is_rejected() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(10, 10));
        let (cache, _temp) = create_cache(&fetcher, true);

        let err = cache.get(&descriptor("../../etc")).await.unwrap_err();

        assert!(matches!(err, CoverError::InvalidCacheKey(_)));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_download() {
        let fetcher =
            Arc::new(MockImageFetcher::serving_png(50, 50).with_delay(Duration::from_millis(50)));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        let (a, b, c) = tokio::join!(cache.get(&d), cache.get(&d), cache.get(&d));

        assert_eq!(fetcher.calls(), 1);
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        for joined in [&b, &c] {
            assert_eq!(joined.source, CoverSource::Network);
            assert_eq!(a.image.to_rgba8(), joined.image.to_rgba8());
        }
        assert_eq!(cache.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_failure_reaches_every_waiter() {
        let fetcher =
            Arc::new(MockImageFetcher::failing().with_delay(Duration::from_millis(50)));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        let (a, b) = tokio::join!(cache.get(&d), cache.get(&d));

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(a.unwrap_err(), b.unwrap_err());
        assert_eq!(cache.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiters_leave_no_flight_behind() {
        let fetcher =
            Arc::new(MockImageFetcher::serving_png(50, 50).with_delay(Duration::from_millis(500)));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        let timed_out = tokio::time::timeout(Duration::from_millis(20), async {
            tokio::join!(cache.get(&d), cache.get(&d))
        })
        .await;

        assert!(timed_out.is_err());
        assert_eq!(cache.in_flight_count(), 0);
        assert!(!cache.contains(&d).await);
    }

    #[tokio::test]
    async fn test_request_after_cancellation_starts_fresh_flight() {
        let fetcher =
            Arc::new(MockImageFetcher::serving_png(50, 50).with_delay(Duration::from_millis(100)));
        let (cache, _temp) = create_cache(&fetcher, true);
        let d = descriptor("RMCE01");

        let _ = tokio::time::timeout(Duration::from_millis(10), cache.get(&d)).await;
        let cover = cache.get(&d).await.unwrap();

        assert_eq!(cover.source, CoverSource::Network);
        assert_eq!(cache.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_without_coalescing_each_miss_downloads() {
        let fetcher =
            Arc::new(MockImageFetcher::serving_png(50, 50).with_delay(Duration::from_millis(50)));
        let (cache, _temp) = create_cache(&fetcher, false);
        let d = descriptor("RMCE01");

        let (a, b) = tokio::join!(cache.get(&d), cache.get(&d));

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(a.unwrap().image.to_rgba8(), b.unwrap().image.to_rgba8());
        let stored = image::open(cache.entry_path(d.cache_key()).unwrap()).unwrap();
        assert_eq!(stored.dimensions(), (176, 248));
    }

    #[tokio::test]
    async fn test_distinct_keys_download_separately() {
        let fetcher = Arc::new(MockImageFetcher::serving_png(20, 20));
        let (cache, _temp) = create_cache(&fetcher, true);

        cache.get(&descriptor("RMCE01")).await.unwrap();
        cache.get(&descriptor("RMCJ01")).await.unwrap();

        assert_eq!(fetcher.calls(), 2);
    }
}
