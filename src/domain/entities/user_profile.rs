//! Per-user profile record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute holding the user's cover region preference.
pub const COVER_REGION_ATTRIBUTE: &str = "coverregion";

/// Stored user profile.
///
/// Unknown attributes written through `edit` are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// User snowflake.
    pub id: String,
    /// Owned games.
    #[serde(default)]
    pub games: Vec<String>,
    /// Recently played games.
    #[serde(default)]
    pub lastplayed: Vec<Value>,
    /// Coin balance.
    #[serde(default)]
    pub coins: i64,
    /// Friend code.
    #[serde(default = "default_friend_code")]
    pub friend_code: String,
    /// Service region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Card overlay file.
    #[serde(default = "default_overlay")]
    pub overlay: String,
    /// Card background image.
    #[serde(default = "default_background")]
    pub bg: String,
    /// Game sort order.
    #[serde(default)]
    pub sort: String,
    /// Card font.
    #[serde(default = "default_font")]
    pub font: String,
    /// Cover region override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverregion: Option<String>,
    /// Any other attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Creates a profile with default settings.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            games: Vec::new(),
            lastplayed: Vec::new(),
            coins: 0,
            friend_code: default_friend_code(),
            region: default_region(),
            overlay: default_overlay(),
            bg: default_background(),
            sort: String::new(),
            font: default_font(),
            coverregion: None,
            extra: Map::new(),
        }
    }
}

fn default_friend_code() -> String {
    "0000 0000 0000 0000".to_string()
}

fn default_region() -> String {
    "rc24".to_string()
}

fn default_overlay() -> String {
    "overlay1.json".to_string()
}

fn default_background() -> String {
    "img/1200x450/riiconnect241.png".to_string()
}

fn default_font() -> String {
    "default".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_json() {
        let profile = UserProfile::new("42", "mario");
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["friend_code"], "0000 0000 0000 0000");
        assert_eq!(json["region"], "rc24");
        assert_eq!(json["font"], "default");
        assert!(json.get(COVER_REGION_ATTRIBUTE).is_none());
    }

    #[test]
    fn test_unknown_attributes_are_kept() {
        let raw = r#"{"name":"luigi","id":"7","coverregion":"fr","theme":"dark"}"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();

        assert_eq!(profile.coverregion.as_deref(), Some("fr"));
        assert_eq!(profile.extra.get("theme"), Some(&Value::from("dark")));
        assert_eq!(profile.coins, 0);

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["theme"], "dark");
    }
}
