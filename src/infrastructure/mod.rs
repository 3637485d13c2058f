//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image handling (transport, normalization, caching).
pub mod image;
/// User profile storage.
pub mod storage;

pub use config::{AppConfig, CliArgs, ConfigStore, LogLevel};
pub use self::image::{AvatarCache, CoverCache, CoverCacheConfig, HttpImageFetcher};
pub use storage::JsonProfileStore;
