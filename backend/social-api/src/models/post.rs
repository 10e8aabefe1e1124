use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{AuthorSummary, CommentView};

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub content: String,
    pub image: String,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }
}

/// A post with its author and comments resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: AuthorSummary,
    pub content: String,
    pub image: String,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    pub fn new(post: Post, user: AuthorSummary, comments: Vec<CommentView>) -> Self {
        Self {
            id: post.id,
            user,
            content: post.content,
            image: post.image,
            likes: post.likes,
            comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 280))]
    pub content: Option<String>,
    /// URL of an already-uploaded image.
    #[validate(url)]
    pub image: Option<String>,
}

impl CreatePostRequest {
    pub fn content(&self) -> &str {
        self.content.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn image(&self) -> &str {
        self.image.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.content().is_empty() && self.image().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub content: String,
    pub image: String,
}
