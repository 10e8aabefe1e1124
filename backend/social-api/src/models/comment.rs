use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::AuthorSummary;

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "post")]
    pub post_id: Uuid,
    pub content: String,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: AuthorSummary,
    pub post: Uuid,
    pub content: String,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(comment: Comment, user: AuthorSummary) -> Self {
        Self {
            id: comment.id,
            user,
            post: comment.post_id,
            content: comment.content,
            likes: comment.likes,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(max = 280))]
    pub content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
}
