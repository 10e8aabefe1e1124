mod postgres;

#[cfg(test)]
pub mod memory;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{
    Comment, NewComment, NewNotification, NewPost, NewUser, Notification, Post, ProfileUpdate,
    User,
};

/// Document-level access to users, posts, comments and notifications.
///
/// Lists come back newest first. Lookups by a set of ids return whatever
/// exists, in no particular order.
#[async_trait::async_trait]
pub trait SocialStore: Send + Sync {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn user_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    async fn insert_user(&self, user: NewUser) -> Result<User>;

    /// Returns `None` when the user does not exist.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>>;

    /// Adds (or removes) `target` to `follower.following` and `follower` to
    /// `target.followers` together.
    async fn set_following(&self, follower: Uuid, target: Uuid, follow: bool) -> Result<()>;

    /// All posts, or only those written by `author`.
    async fn list_posts(&self, author: Option<Uuid>) -> Result<Vec<Post>>;

    async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>>;

    async fn insert_post(&self, post: NewPost) -> Result<Post>;

    async fn set_post_like(&self, post_id: Uuid, user_id: Uuid, liked: bool) -> Result<()>;

    /// Removes the post together with its comments.
    async fn delete_post(&self, id: Uuid) -> Result<()>;

    async fn comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>>;

    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    async fn comments_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Comment>>;

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment>;

    async fn delete_comment(&self, id: Uuid) -> Result<()>;

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification>;

    async fn notifications_for(&self, recipient: Uuid) -> Result<Vec<Notification>>;

    /// Deletes only when `recipient` owns the notification. Returns whether a
    /// row was removed.
    async fn delete_notification(&self, id: Uuid, recipient: Uuid) -> Result<bool>;
}

#[derive(Clone)]
pub struct Database {
    pub pg: PgPool,
}

impl Database {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self> {
        let pg = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");

        Ok(Self { pg })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pg).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }
}
