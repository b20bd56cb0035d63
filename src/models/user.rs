use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account.
///
/// Identity fields (`id`, `email`) are immutable after creation; only the
/// profile fields (`display_name`, `avatar_url`) may change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// Opaque bearer credential, never serialized in responses
    #[serde(skip_serializing, default)]
    pub api_token: String,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Create a new User with a freshly issued API token
    pub fn new(email: String, display_name: String, avatar_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            avatar_url,
            api_token: Uuid::new_v4().simple().to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
