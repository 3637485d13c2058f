//! Cover artifact descriptor and its component types.

use std::fmt;
use std::sync::Arc;

use super::GameId;

/// Console family a game belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Wii. Also the fallback for unrecognized identifiers.
    Wii,
    /// Wii U.
    WiiU,
    /// Nintendo DS.
    Ds,
    /// Nintendo 3DS.
    ThreeDs,
}

impl Platform {
    /// Returns the token used in URLs, cache keys and explicit identifiers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wii => "wii",
            Self::WiiU => "wiiu",
            Self::Ds => "ds",
            Self::ThreeDs => "3ds",
        }
    }

    /// Matches an explicit platform token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "wii" => Some(Self::Wii),
            "wiiu" => Some(Self::WiiU),
            "ds" => Some(Self::Ds),
            "3ds" => Some(Self::ThreeDs),
            _ => None,
        }
    }

    /// Returns true for the DS family handhelds.
    #[must_use]
    pub const fn is_handheld(self) -> bool {
        matches!(self, Self::Ds | Self::ThreeDs)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of cover artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverKind {
    /// Flat front cover.
    Cover,
    /// Rendered 3D case.
    Cover3D,
    /// Disc label.
    Disc,
    /// Handheld box art.
    Box,
}

impl CoverKind {
    /// Returns the token used in URLs and cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Cover3D => "cover3D",
            Self::Disc => "disc",
            Self::Box => "box",
        }
    }
}

impl fmt::Display for CoverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CoverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cover" => Ok(Self::Cover),
            "cover3D" | "cover3d" => Ok(Self::Cover3D),
            "disc" => Ok(Self::Disc),
            "box" => Ok(Self::Box),
            other => Err(format!("unknown cover kind: {other}")),
        }
    }
}

/// Upper-case region code such as `US` or `JA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    /// Creates a region from a known code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user's requested cover region.
///
/// Only two ASCII letters count as a preference; anything else is kept but
/// ignored by resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPreference(String);

impl RegionPreference {
    /// Wraps a raw preference string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the upper-cased region if the preference is valid.
    #[must_use]
    pub fn region(&self) -> Option<Region> {
        let code = self.0.as_str();
        (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
            .then(|| Region::new(code.to_ascii_uppercase()))
    }

    /// Returns the raw preference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionPreference {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RegionPreference {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Pixel size of a normalized cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Creates new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// File extension of the remote artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// JPEG.
    Jpg,
    /// PNG.
    Png,
}

impl Extension {
    /// Returns the extension without a leading dot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a cached cover: `<platform>-<kind>-<identifier>-<region>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Extension every cache entry is stored with.
    pub const FILE_EXTENSION: &'static str = "png";

    /// Builds the key from the fields that identify an artifact.
    #[must_use]
    pub fn new(platform: Platform, kind: CoverKind, game: &GameId, region: &Region) -> Self {
        Self(format!("{platform}-{kind}-{game}-{region}"))
    }

    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the cache entry.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, Self::FILE_EXTENSION)
    }

    /// Returns true if the key cannot escape the cache directory.
    #[must_use]
    pub fn is_path_safe(&self) -> bool {
        !self.0.contains(['/', '\\', '\0']) && !self.0.contains("..")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything needed to fetch, size and cache one cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverDescriptor {
    game: GameId,
    platform: Platform,
    kind: CoverKind,
    region: Region,
    dimensions: Dimensions,
    extension: Extension,
    cache_key: CacheKey,
}

impl CoverDescriptor {
    /// Assembles a descriptor. The cache key is derived here from the
    /// identifying fields only.
    #[must_use]
    pub fn new(
        game: GameId,
        platform: Platform,
        kind: CoverKind,
        region: Region,
        dimensions: Dimensions,
        extension: Extension,
    ) -> Self {
        let cache_key = CacheKey::new(platform, kind, &game, &region);
        Self {
            game,
            platform,
            kind,
            region,
            dimensions,
            extension,
            cache_key,
        }
    }

    /// The identifier this descriptor was resolved from.
    #[must_use]
    pub const fn game(&self) -> &GameId {
        &self.game
    }

    /// Console family.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Artwork kind.
    #[must_use]
    pub const fn kind(&self) -> CoverKind {
        self.kind
    }

    /// Region code.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Target size.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Remote file extension.
    #[must_use]
    pub const fn extension(&self) -> Extension {
        self.extension
    }

    /// Cache identity.
    #[must_use]
    pub const fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }
}

/// Where a loaded cover came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSource {
    /// Decoded from an existing cache entry.
    DiskCache,
    /// Downloaded, resized and written to the cache during this request,
    /// either by the request itself or by a concurrent one whose download it
    /// joined.
    Network,
}

/// A decoded cover ready for use.
#[derive(Debug, Clone)]
pub struct LoadedCover {
    /// Cache identity of the cover.
    pub key: CacheKey,
    /// The decoded image, sized to the descriptor's dimensions.
    pub image: Arc<image::DynamicImage>,
    /// Where the image came from.
    pub source: CoverSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        let key = CacheKey::new(
            Platform::Wii,
            CoverKind::Cover3D,
            &GameId::parse("RMCE01"),
            &Region::new("US"),
        );
        assert_eq!(key.as_str(), "wii-cover3D-RMCE01-US");
        assert_eq!(key.file_name(), "wii-cover3D-RMCE01-US.png");
        assert!(key.is_path_safe());
    }

    #[test]
    fn test_cache_key_rejects_traversal() {
        let region = Region::new("US");
        let slash = CacheKey::new(Platform::Wii, CoverKind::Box, &"a/b".into(), &region);
        let dots = CacheKey::new(Platform::Wii, CoverKind::Box, &"..x".into(), &region);
        assert!(!slash.is_path_safe());
        assert!(!dots.is_path_safe());
    }

    #[test]
    fn test_region_preference_validation() {
        assert_eq!(
            RegionPreference::new("fr").region(),
            Some(Region::new("FR"))
        );
        assert_eq!(RegionPreference::new(" de ").region(), None);
        assert_eq!(RegionPreference::new("de ").region(), None);
        assert_eq!(RegionPreference::new("france").region(), None);
        assert_eq!(RegionPreference::new("f").region(), None);
        assert_eq!(RegionPreference::new("f1").region(), None);
        assert_eq!(RegionPreference::new("").region(), None);
    }

    #[test]
    fn test_platform_tokens() {
        for platform in [Platform::Wii, Platform::WiiU, Platform::Ds, Platform::ThreeDs] {
            assert_eq!(Platform::from_token(platform.as_str()), Some(platform));
        }
        assert_eq!(Platform::from_token("WII"), None);
        assert_eq!(Platform::from_token("switch"), None);
    }

    #[test]
    fn test_cover_kind_parse() {
        assert_eq!("cover3D".parse::<CoverKind>(), Ok(CoverKind::Cover3D));
        assert_eq!("disc".parse::<CoverKind>(), Ok(CoverKind::Disc));
        assert!("poster".parse::<CoverKind>().is_err());
    }
}
