//! Use case implementations.

mod get_cover_use_case;

pub use get_cover_use_case::GetCoverUseCase;
