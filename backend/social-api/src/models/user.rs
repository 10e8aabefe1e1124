use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub clerk_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub profile_picture: String,
    pub banner_image: String,
    pub bio: String,
    pub location: String,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }

    pub fn is_following(&self, other: Uuid) -> bool {
        self.following.contains(&other)
    }
}

/// The slice of a user embedded into posts, comments and notifications.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub clerk_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub profile_picture: String,
}

impl NewUser {
    /// Usernames default to the local part of the email address.
    pub fn username_from_email(email: &str) -> String {
        email.split('@').next().unwrap_or_default().to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(max = 50))]
    pub first_name: Option<String>,
    #[validate(length(max = 50))]
    pub last_name: Option<String>,
    #[validate(length(max = 160))]
    pub bio: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    pub profile_picture: Option<String>,
    pub banner_image: Option<String>,
}
