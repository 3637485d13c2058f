//! Profile store port definition.

use async_trait::async_trait;

use crate::domain::entities::UserProfile;
use crate::domain::errors::ProfileError;

/// Port for reading user profiles.
#[async_trait]
pub trait ProfileStorePort: Send + Sync {
    /// Retrieves a stored profile, if any.
    async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError>;

    /// Returns the user's cover region preference, unvalidated.
    async fn cover_region(&self, user_id: &str) -> Result<Option<String>, ProfileError> {
        Ok(self
            .find_profile(user_id)
            .await?
            .and_then(|profile| profile.coverregion))
    }
}
