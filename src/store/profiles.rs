//! Player profiles (display names)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{SupabaseClient, SupabaseError};

/// User profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// New profile for insertion
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub display_name: String,
}

/// Fallback name for accounts that never picked one
pub fn default_display_name(user_id: Uuid) -> String {
    format!("Player_{}", &user_id.simple().to_string()[..8])
}

/// Profile store operations
#[derive(Clone)]
pub struct ProfileStore {
    client: SupabaseClient,
}

impl ProfileStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Get a user profile by ID
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, SupabaseError> {
        let query = format!("id=eq.{}", user_id);
        self.client.get_one("profiles", &query).await
    }

    /// Create a new user profile
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        display_name: &str,
    ) -> Result<UserProfile, SupabaseError> {
        let profile = NewProfile {
            id: user_id,
            display_name: display_name.to_string(),
        };
        self.client.insert("profiles", &profile).await
    }

    /// Display name for `user_id`, creating the profile on first sight
    pub async fn display_name(&self, user_id: Uuid, suggested: Option<&str>) -> Result<String, SupabaseError> {
        if let Some(profile) = self.get_profile(user_id).await? {
            return Ok(profile
                .display_name
                .unwrap_or_else(|| default_display_name(user_id)));
        }

        let name = suggested
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_display_name(user_id));
        let created = self.create_profile(user_id, &name).await?;
        Ok(created.display_name.unwrap_or(name))
    }
}
