//! Domain entity definitions.

mod cover;
mod game_id;
mod user_profile;

pub use cover::{
    CacheKey, CoverDescriptor, CoverKind, CoverSource, Dimensions, Extension, LoadedCover,
    Platform, Region, RegionPreference,
};
pub use game_id::GameId;
pub use user_profile::{COVER_REGION_ATTRIBUTE, UserProfile};
