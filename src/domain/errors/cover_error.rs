//! Cover loading error types.

use thiserror::Error;

/// Result type for cover operations.
pub type CoverResult<T> = std::result::Result<T, CoverError>;

/// Errors that can occur while loading a cover.
///
/// `Clone` so that every request joined to one in-flight fetch receives the
/// same outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoverError {
    /// Transport failure, non-success status or unreadable response body.
    #[error("fetch error: {0}")]
    Fetch(String),
    /// Bytes could not be interpreted as an image.
    #[error("decode error: {0}")]
    Decode(String),
    /// Cache directory or file could not be read, created or written.
    #[error("io error: {0}")]
    Io(String),
    /// Cache key cannot be used as a file name.
    #[error("invalid cache key: {0}")]
    InvalidCacheKey(String),
}

impl CoverError {
    /// Creates fetch error.
    #[must_use]
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates io error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}
