//! Cover request DTOs.

use crate::domain::entities::{CoverDescriptor, CoverKind, GameId, LoadedCover, RegionPreference};

/// Where the region preference used for a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceSource {
    /// Supplied with the request.
    Request,
    /// Read from the user's stored profile.
    Profile,
    /// No preference available.
    None,
}

impl PreferenceSource {
    /// Returns human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Profile => "user profile",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for PreferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Cover request data.
#[derive(Debug, Clone)]
pub struct CoverRequest {
    /// Game identifier.
    pub game: GameId,
    /// User whose stored preference applies.
    pub user_id: Option<String>,
    /// Explicit region preference; wins over the stored one.
    pub region: Option<RegionPreference>,
    /// Explicit cover kind; defaults to the platform's kind.
    pub kind: Option<CoverKind>,
}

impl CoverRequest {
    /// Creates new request for a game.
    #[must_use]
    pub fn new(game: impl Into<GameId>) -> Self {
        Self {
            game: game.into(),
            user_id: None,
            region: None,
            kind: None,
        }
    }

    /// Applies a user's stored preference.
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets an explicit region preference.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<RegionPreference>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Requests a specific cover kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: CoverKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Cover response data.
#[derive(Debug, Clone)]
pub struct CoverResponse {
    /// Resolved descriptor.
    pub descriptor: CoverDescriptor,
    /// Loaded cover.
    pub cover: LoadedCover,
    /// Where the region preference came from.
    pub preference_source: PreferenceSource,
}
