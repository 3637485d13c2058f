//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Identifier resolution.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{CoverRequest, CoverResponse, PreferenceSource};
pub use services::CoverResolver;
pub use use_cases::GetCoverUseCase;
