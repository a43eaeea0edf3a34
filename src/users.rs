//! User profiles and display preferences

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::storage::{self, DurableStore, Namespace, StorageError};

/// Text size preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl std::fmt::Display for FontSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontSize::Small => write!(f, "small"),
            FontSize::Medium => write!(f, "medium"),
            FontSize::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for FontSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" => Ok(FontSize::Small),
            "medium" => Ok(FontSize::Medium),
            "large" => Ok(FontSize::Large),
            other => Err(format!("unknown font size '{}' (expected small, medium or large)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub dark_mode: bool,
    pub font_size: FontSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub preferences: Preferences,
}

impl UserProfile {
    /// Profile with default preferences
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            preferences: Preferences::default(),
        }
    }
}

/// Profiles keyed by user id
pub struct UserRepository {
    store: Arc<dyn DurableStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    pub async fn save_user(&self, profile: &UserProfile) -> Result<(), StorageError> {
        storage::put_record(self.store.as_ref(), Namespace::Users, &profile.id, profile).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError> {
        storage::get_record(self.store.as_ref(), Namespace::Users, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    #[tokio::test]
    async fn test_profile_upsert() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let users = UserRepository::new(store.clone());

        let mut profile = UserProfile::new("demo-user", "Learner");
        users.save_user(&profile).await.unwrap();

        profile.preferences.dark_mode = true;
        profile.preferences.font_size = FontSize::Large;
        users.save_user(&profile).await.unwrap();

        assert_eq!(store.count(Namespace::Users).await.unwrap(), 1);
        assert_eq!(users.get_user("demo-user").await.unwrap(), Some(profile));
        assert_eq!(users.get_user("someone-else").await.unwrap(), None);
    }

    #[test]
    fn test_preferences_wire_shape() {
        let value = serde_json::to_value(Preferences::default()).unwrap();
        assert_eq!(value, serde_json::json!({ "darkMode": false, "fontSize": "medium" }));
    }

    #[test]
    fn test_font_size_parse() {
        assert_eq!("LARGE".parse::<FontSize>(), Ok(FontSize::Large));
        assert!("huge".parse::<FontSize>().is_err());
    }
}
