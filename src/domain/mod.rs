//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CoverDescriptor, GameId, LoadedCover};
pub use errors::{CoverError, CoverResult, ProfileError};
pub use ports::{CoverCachePort, ImageFetchPort, ProfileStorePort};
