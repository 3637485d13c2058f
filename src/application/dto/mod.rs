//! Data transfer objects for the application layer.

mod cover_dto;

pub use cover_dto::{CoverRequest, CoverResponse, PreferenceSource};
