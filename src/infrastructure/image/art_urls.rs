//! Remote artwork URL construction.

use crate::domain::entities::CoverDescriptor;

/// Default host serving cover artwork.
pub const DEFAULT_ART_BASE_URL: &str = "https://art.gametdb.com";

/// Default host serving user avatars.
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://cdn.discordapp.com";

/// Avatar edge length requested from the avatar host.
pub const AVATAR_REQUEST_SIZE: u32 = 512;

/// Builds the artwork URL for a descriptor:
/// `<base>/<platform>/<kind>/<region>/<identifier>.<extension>`.
#[must_use]
pub fn cover_url(base_url: &str, descriptor: &CoverDescriptor) -> String {
    format!(
        "{}/{}/{}/{}/{}.{}",
        base_url.trim_end_matches('/'),
        descriptor.platform(),
        descriptor.kind(),
        descriptor.region(),
        descriptor.game(),
        descriptor.extension()
    )
}

/// Builds the avatar URL for a user.
#[must_use]
pub fn avatar_url(base_url: &str, user_id: &str, avatar_hash: &str) -> String {
    format!(
        "{}/avatars/{user_id}/{avatar_hash}.jpg?size={AVATAR_REQUEST_SIZE}",
        base_url.trim_end_matches('/')
    )
}
