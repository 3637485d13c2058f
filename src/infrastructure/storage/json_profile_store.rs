//! JSON file profile store.
//!
//! One pretty-printed file per user at `<dir>/<id>.json`, plus a `_keys.json`
//! registry mapping user ids to their access keys.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::entities::UserProfile;
use crate::domain::errors::ProfileError;
use crate::domain::ports::ProfileStorePort;

const KEYS_FILE_NAME: &str = "_keys.json";

/// User id to access key.
type KeyRegistry = BTreeMap<String, String>;

/// Profile store backed by JSON files.
#[derive(Debug)]
pub struct JsonProfileStore {
    users_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonProfileStore {
    /// Creates a store rooted at `users_dir`. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(users_dir: impl Into<PathBuf>) -> Self {
        Self {
            users_dir: users_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the directory profiles are stored in.
    #[must_use]
    pub fn users_dir(&self) -> &Path {
        &self.users_dir
    }

    fn profile_path(&self, user_id: &str) -> Result<PathBuf, ProfileError> {
        if user_id.is_empty() || !user_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProfileError::InvalidUserId(user_id.to_string()));
        }
        Ok(self.users_dir.join(format!("{user_id}.json")))
    }

    /// Loads a profile.
    ///
    /// # Errors
    /// Returns `ProfileError::NotFound` if no profile is stored for the id.
    pub async fn get(&self, user_id: &str) -> Result<UserProfile, ProfileError> {
        let object = self.read_object(user_id).await?;
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Creates a default profile and registers an access key for the user.
    ///
    /// An existing profile is left untouched and an existing key is kept.
    /// Returns the user's access key.
    ///
    /// # Errors
    /// Returns error if the profile or key registry cannot be written.
    pub async fn create(&self, user_id: &str, name: &str) -> Result<String, ProfileError> {
        let path = self.profile_path(user_id)?;
        let _guard = self.write_lock.lock().await;

        if fs::try_exists(&path).await? {
            debug!(user_id = %user_id, "Profile already exists");
        } else {
            save_json(&path, &UserProfile::new(user_id, name)).await?;
            info!(user_id = %user_id, "Created profile");
        }

        let mut keys = self.read_keys().await?;
        if let Some(key) = keys.get(user_id) {
            return Ok(key.clone());
        }

        let key = uuid::Uuid::new_v4().simple().to_string();
        keys.insert(user_id.to_string(), key.clone());
        save_json(&self.users_dir.join(KEYS_FILE_NAME), &keys).await?;
        debug!(user_id = %user_id, "Registered access key");

        Ok(key)
    }

    /// Merges `changes` into the stored profile. Later writes win.
    ///
    /// # Errors
    /// Returns `ProfileError::NotFound` if no profile exists, or
    /// `ProfileError::Serialization` if the merged profile is no longer valid.
    pub async fn edit(
        &self,
        user_id: &str,
        changes: Map<String, Value>,
    ) -> Result<(), ProfileError> {
        let path = self.profile_path(user_id)?;
        let _guard = self.write_lock.lock().await;

        let mut object = self.read_object(user_id).await?;
        object.extend(changes);
        let merged: UserProfile = serde_json::from_value(Value::Object(object))?;

        save_json(&path, &merged).await?;
        debug!(user_id = %user_id, "Updated profile");
        Ok(())
    }

    /// Merges a JSON object into the stored profile.
    ///
    /// # Errors
    /// Returns `ProfileError::InvalidEdit` if `changes` is not an object.
    pub async fn edit_value(&self, user_id: &str, changes: Value) -> Result<(), ProfileError> {
        match changes {
            Value::Object(map) => self.edit(user_id, map).await,
            _ => Err(ProfileError::InvalidEdit),
        }
    }

    /// Reads one attribute. Missing and `null` attributes are `None`.
    ///
    /// # Errors
    /// Returns `ProfileError::NotFound` if no profile exists.
    pub async fn get_attribute(
        &self,
        user_id: &str,
        key: &str,
    ) -> Result<Option<Value>, ProfileError> {
        let mut object = self.read_object(user_id).await?;
        Ok(object.remove(key).filter(|value| !value.is_null()))
    }

    /// Returns the access key registered for a user.
    ///
    /// # Errors
    /// Returns error if the key registry cannot be read.
    pub async fn get_key(&self, user_id: &str) -> Result<Option<String>, ProfileError> {
        Ok(self.read_keys().await?.remove(user_id))
    }

    /// Returns the user an access key belongs to.
    ///
    /// # Errors
    /// Returns error if the key registry cannot be read.
    pub async fn get_id(&self, key: &str) -> Result<Option<String>, ProfileError> {
        Ok(self
            .read_keys()
            .await?
            .into_iter()
            .find_map(|(user_id, stored)| (stored == key).then_some(user_id)))
    }

    async fn read_object(&self, user_id: &str) -> Result<Map<String, Value>, ProfileError> {
        let path = self.profile_path(user_id)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProfileError::NotFound(user_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn read_keys(&self) -> Result<KeyRegistry, ProfileError> {
        match fs::read_to_string(self.users_dir.join(KEYS_FILE_NAME)).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(KeyRegistry::new()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), ProfileError> {
    let content = serde_json::to_string_pretty(data)?;
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<(), ProfileError> {
        let parent = path
            .parent()
            .ok_or_else(|| std::io::Error::other("Invalid path"))?;
        std::fs::create_dir_all(parent)?;
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(std::io::Error::other)?
}

#[async_trait]
impl ProfileStorePort for JsonProfileStore {
    async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
        match self.get(user_id).await {
            Ok(profile) => Ok(Some(profile)),
            Err(ProfileError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
