//! Image handling infrastructure.
//!
//! This module provides:
//! - Artwork and avatar URL construction
//! - HTTP image transport
//! - Decode, resize and atomic PNG persistence
//! - The lazy cover cache and the avatar cache

pub mod art_urls;
pub mod avatar_cache;
pub mod cover_cache;
pub mod http_fetcher;
pub mod raster;

pub use art_urls::{DEFAULT_ART_BASE_URL, DEFAULT_AVATAR_BASE_URL, avatar_url, cover_url};
pub use avatar_cache::{AVATAR_DIMENSIONS, AvatarCache};
pub use cover_cache::{CoverCache, CoverCacheConfig};
pub use http_fetcher::{DEFAULT_TIMEOUT_SECS, HttpImageFetcher};
