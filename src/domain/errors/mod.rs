//! Domain error types.

mod cover_error;
mod profile_error;

pub use cover_error::{CoverError, CoverResult};
pub use profile_error::ProfileError;
