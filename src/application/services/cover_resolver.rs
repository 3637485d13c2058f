//! Resolves game identifiers into cover descriptors.
//!
//! Resolution is total: every lookup ends in a default, so malformed
//! identifiers resolve to a Wii cover in the `EN` region instead of failing.

use crate::domain::entities::{
    CoverDescriptor, CoverKind, Dimensions, Extension, GameId, Platform, Region, RegionPreference,
};

/// Platforms inferred from the first character when no explicit token matches.
const PLATFORM_BY_LEADING: &[(char, Platform)] = &[
    ('A', Platform::WiiU),
    ('B', Platform::WiiU),
    ('R', Platform::Wii),
    ('S', Platform::Wii),
];

const FALLBACK_PLATFORM: Platform = Platform::Wii;

const DEFAULT_REGION: &str = "EN";

#[derive(Debug, Clone, Copy)]
enum RegionOutcome {
    /// The caller's preference, when it is a valid two-letter code.
    Preferred,
    Fixed(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct RegionRule {
    /// `None` matches any code.
    code: Option<char>,
    outcome: RegionOutcome,
}

impl RegionRule {
    const fn on(code: char, outcome: RegionOutcome) -> Self {
        Self {
            code: Some(code),
            outcome,
        }
    }

    const fn otherwise(outcome: RegionOutcome) -> Self {
        Self {
            code: None,
            outcome,
        }
    }

    fn apply(&self, code: Option<char>, preference: Option<&RegionPreference>) -> Option<Region> {
        if self.code.is_some() && self.code != code {
            return None;
        }
        match self.outcome {
            RegionOutcome::Preferred => preference.and_then(RegionPreference::region),
            RegionOutcome::Fixed(region) => Some(Region::new(region)),
        }
    }
}

/// Evaluated top to bottom; the first rule producing a region wins.
const REGION_RULES: &[RegionRule] = &[
    RegionRule::on('P', RegionOutcome::Preferred),
    RegionRule::on('P', RegionOutcome::Fixed("US")),
    RegionRule::on('E', RegionOutcome::Fixed("US")),
    RegionRule::on('J', RegionOutcome::Fixed("JA")),
    RegionRule::on('K', RegionOutcome::Fixed("KO")),
    RegionRule::on('W', RegionOutcome::Fixed("TW")),
    RegionRule::otherwise(RegionOutcome::Fixed(DEFAULT_REGION)),
];

/// Detects the console family.
///
/// An explicit `<platform>-` prefix wins over inference from the first
/// character.
#[must_use]
pub fn detect_platform(game: &GameId) -> Platform {
    if let Some(platform) = game.platform_token().and_then(Platform::from_token) {
        return platform;
    }

    game.leading()
        .and_then(|leading| {
            PLATFORM_BY_LEADING
                .iter()
                .find(|(c, _)| *c == leading)
                .map(|(_, platform)| *platform)
        })
        .unwrap_or(FALLBACK_PLATFORM)
}

/// Cover kind used for a platform when the caller does not ask for one.
#[must_use]
pub const fn default_kind(platform: Platform) -> CoverKind {
    if platform.is_handheld() {
        CoverKind::Box
    } else {
        CoverKind::Cover3D
    }
}

/// Detects the region from the identifier's region code.
///
/// The preference only applies to the `P` code.
#[must_use]
pub fn detect_region(game: &GameId, preference: Option<&RegionPreference>) -> Region {
    let code = game.region_code();
    REGION_RULES
        .iter()
        .find_map(|rule| rule.apply(code, preference))
        .unwrap_or_else(|| Region::new(DEFAULT_REGION))
}

/// Remote file extension. Only non-Wii flat covers are served as JPEG.
#[must_use]
pub fn extension_for(platform: Platform, kind: CoverKind) -> Extension {
    if platform != Platform::Wii && kind == CoverKind::Cover {
        Extension::Jpg
    } else {
        Extension::Png
    }
}

/// Target size of a normalized cover.
#[must_use]
pub const fn dimensions_for(platform: Platform, kind: CoverKind) -> Dimensions {
    match kind {
        CoverKind::Cover => {
            let height = if platform.is_handheld() { 144 } else { 224 };
            Dimensions::new(160, height)
        }
        CoverKind::Disc => Dimensions::new(160, 160),
        CoverKind::Cover3D | CoverKind::Box => Dimensions::new(176, 248),
    }
}

/// Resolver for cover descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverResolver;

impl CoverResolver {
    /// Creates a new resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolves the platform's default cover kind for `game`.
    #[must_use]
    pub fn resolve(&self, game: &GameId, preference: Option<&RegionPreference>) -> CoverDescriptor {
        let platform = detect_platform(game);
        self.build(game, platform, default_kind(platform), preference)
    }

    /// Resolves a specific cover kind for `game`.
    #[must_use]
    pub fn resolve_as(
        &self,
        game: &GameId,
        preference: Option<&RegionPreference>,
        kind: CoverKind,
    ) -> CoverDescriptor {
        self.build(game, detect_platform(game), kind, preference)
    }

    #[allow(clippy::unused_self)]
    fn build(
        &self,
        game: &GameId,
        platform: Platform,
        kind: CoverKind,
        preference: Option<&RegionPreference>,
    ) -> CoverDescriptor {
        CoverDescriptor::new(
            game.clone(),
            platform,
            kind,
            detect_region(game, preference),
            dimensions_for(platform, kind),
            extension_for(platform, kind),
        )
    }
}
