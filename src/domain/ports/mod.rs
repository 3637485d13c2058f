mod cover_cache_port;
mod image_fetch_port;
mod profile_store_port;

pub use cover_cache_port::CoverCachePort;
pub use image_fetch_port::ImageFetchPort;
pub use profile_store_port::ProfileStorePort;

#[cfg(test)]
pub mod mocks {
    pub use super::image_fetch_port::mock::{MockImageFetcher, png_bytes};
    pub use super::profile_store_port::mock::MockProfileStore;
}
