//! gamecover - Game cover art resolution and caching.
//!
//! This crate resolves game identifiers into cover artwork descriptors,
//! downloads the artwork on first use, normalizes it to a fixed-size PNG and
//! serves it from a local cache afterwards.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the resolver, use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "gamecover";
