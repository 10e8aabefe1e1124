use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::AuthorSummary;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Follow => "follow",
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(NotificationKind::Follow),
            "like" => Ok(NotificationKind::Like),
            "comment" => Ok(NotificationKind::Comment),
            other => Err(anyhow::anyhow!("unknown notification type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub kind: NotificationKind,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub kind: NotificationKind,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
}

impl NewNotification {
    pub fn follow(from_user: Uuid, to_user: Uuid) -> Self {
        Self {
            from_user,
            to_user,
            kind: NotificationKind::Follow,
            post_id: None,
            comment_id: None,
        }
    }

    pub fn like(from_user: Uuid, to_user: Uuid, post_id: Uuid) -> Self {
        Self {
            from_user,
            to_user,
            kind: NotificationKind::Like,
            post_id: Some(post_id),
            comment_id: None,
        }
    }

    pub fn comment(from_user: Uuid, to_user: Uuid, post_id: Uuid, comment_id: Uuid) -> Self {
        Self {
            from_user,
            to_user,
            kind: NotificationKind::Comment,
            post_id: Some(post_id),
            comment_id: Some(comment_id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSnippet {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub content: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentSnippet {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub from: AuthorSummary,
    pub to: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub post: Option<PostSnippet>,
    pub comment: Option<CommentSnippet>,
    pub created_at: DateTime<Utc>,
}
