//! Profile store error types.

use thiserror::Error;

/// Profile store error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ProfileError {
    #[error("no profile stored for user {0}")]
    NotFound(String),

    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("profile storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("profile edits must be a JSON object")]
    InvalidEdit,
}
