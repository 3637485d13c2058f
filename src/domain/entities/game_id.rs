//! Parsed game identifier value object.

use std::fmt;

/// Separator between an explicit platform token and the rest of the identifier.
const PLATFORM_SEPARATOR: char = '-';

/// Character offset holding the region code.
const REGION_OFFSET: usize = 3;

/// A game identifier, parsed once into the fields resolution looks at.
///
/// The raw text is kept verbatim: it is part of both the remote URL and the
/// cache key. Parsing never fails; missing positions are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameId {
    raw: String,
    platform_token: Option<String>,
    leading: Option<char>,
    region_code: Option<char>,
}

impl GameId {
    /// Parses an identifier.
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let platform_token = raw
            .split_once(PLATFORM_SEPARATOR)
            .map(|(head, _)| head.to_string());
        let leading = raw.chars().next();
        let region_code = raw.chars().nth(REGION_OFFSET);

        Self {
            raw,
            platform_token,
            leading,
            region_code,
        }
    }

    /// Returns the identifier exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Text before the first `-`, if the identifier contains one.
    #[must_use]
    pub fn platform_token(&self) -> Option<&str> {
        self.platform_token.as_deref()
    }

    /// First character of the identifier.
    #[must_use]
    pub const fn leading(&self) -> Option<char> {
        self.leading
    }

    /// Character at the region offset.
    #[must_use]
    pub const fn region_code(&self) -> Option<char> {
        self.region_code
    }

    /// Returns true if the identifier is long enough to carry a region code.
    ///
    /// Resolution does not consult this; it lets callers notice identifiers
    /// that will silently take the default path.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.region_code.is_some()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for GameId {
    fn from(s: String) -> Self {
        Self::parse(s)
    }
}
