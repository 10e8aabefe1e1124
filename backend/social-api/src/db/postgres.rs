use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Database, SocialStore};
use crate::models::{
    Comment, NewComment, NewNotification, NewPost, NewUser, Notification, Post, ProfileUpdate,
    User,
};

const USER_COLUMNS: &str = "id, clerk_id, email, first_name, last_name, username, \
    profile_picture, banner_image, bio, location, followers, following, created_at, updated_at";

const POST_COLUMNS: &str = "id, user_id, content, image, likes, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, user_id, post_id, content, likes, created_at, updated_at";

const NOTIFICATION_COLUMNS: &str = "id, from_user, to_user, kind, post_id, comment_id, created_at";

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: Uuid,
    from_user: Uuid,
    to_user: Uuid,
    kind: String,
    post_id: Option<Uuid>,
    comment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = anyhow::Error;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Notification {
            id: row.id,
            from_user: row.from_user,
            to_user: row.to_user,
            kind: row.kind.parse()?,
            post_id: row.post_id,
            comment_id: row.comment_id,
            created_at: row.created_at,
        })
    }
}

#[async_trait::async_trait]
impl SocialStore for Database {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pg)
        .await?;

        Ok(user)
    }

    async fn user_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE clerk_id = $1",
            USER_COLUMNS
        ))
        .bind(clerk_id)
        .fetch_optional(&self.pg)
        .await?;

        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pg)
        .await?;

        Ok(user)
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ANY($1)",
            USER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pg)
        .await?;

        Ok(users)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, clerk_id, email, first_name, last_name, username, profile_picture)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user.clerk_id)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.username)
        .bind(user.profile_picture)
        .fetch_one(&self.pg)
        .await?;

        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                bio = COALESCE($4, bio),
                location = COALESCE($5, location),
                profile_picture = COALESCE($6, profile_picture),
                banner_image = COALESCE($7, banner_image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.bio)
        .bind(update.location)
        .bind(update.profile_picture)
        .bind(update.banner_image)
        .fetch_optional(&self.pg)
        .await?;

        Ok(user)
    }

    async fn set_following(&self, follower: Uuid, target: Uuid, follow: bool) -> Result<()> {
        let mut tx = self.pg.begin().await?;

        if follow {
            sqlx::query(
                r#"
                UPDATE users SET following = array_append(following, $2), updated_at = NOW()
                WHERE id = $1 AND NOT ($2 = ANY(following))
                "#,
            )
            .bind(follower)
            .bind(target)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE users SET followers = array_append(followers, $2), updated_at = NOW()
                WHERE id = $1 AND NOT ($2 = ANY(followers))
                "#,
            )
            .bind(target)
            .bind(follower)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                "UPDATE users SET following = array_remove(following, $2), updated_at = NOW() WHERE id = $1",
            )
            .bind(follower)
            .bind(target)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE users SET followers = array_remove(followers, $2), updated_at = NOW() WHERE id = $1",
            )
            .bind(target)
            .bind(follower)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_posts(&self, author: Option<Uuid>) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {} FROM posts
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            "#,
            POST_COLUMNS
        ))
        .bind(author)
        .fetch_all(&self.pg)
        .await?;

        Ok(posts)
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pg)
        .await?;

        Ok(post)
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE id = ANY($1)",
            POST_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pg)
        .await?;

        Ok(posts)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (id, user_id, content, image)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(post.user_id)
        .bind(post.content)
        .bind(post.image)
        .fetch_one(&self.pg)
        .await?;

        Ok(post)
    }

    async fn set_post_like(&self, post_id: Uuid, user_id: Uuid, liked: bool) -> Result<()> {
        let query = if liked {
            r#"
            UPDATE posts SET likes = array_append(likes, $2), updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(likes))
            "#
        } else {
            "UPDATE posts SET likes = array_remove(likes, $2), updated_at = NOW() WHERE id = $1"
        };

        sqlx::query(query)
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pg)
            .await?;

        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pg.begin().await?;

        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE post_id = ANY($1) ORDER BY created_at DESC",
            COMMENT_COLUMNS
        ))
        .bind(post_ids)
        .fetch_all(&self.pg)
        .await?;

        Ok(comments)
    }

    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pg)
        .await?;

        Ok(comment)
    }

    async fn comments_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Comment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = ANY($1)",
            COMMENT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pg)
        .await?;

        Ok(comments)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (id, user_id, post_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(comment.user_id)
        .bind(comment.post_id)
        .bind(comment.content)
        .fetch_one(&self.pg)
        .await?;

        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pg)
            .await?;

        Ok(())
    }

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            INSERT INTO notifications (id, from_user, to_user, kind, post_id, comment_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(notification.from_user)
        .bind(notification.to_user)
        .bind(notification.kind.as_str())
        .bind(notification.post_id)
        .bind(notification.comment_id)
        .fetch_one(&self.pg)
        .await?;

        row.try_into()
    }

    async fn notifications_for(&self, recipient: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE to_user = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(recipient)
        .fetch_all(&self.pg)
        .await?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn delete_notification(&self, id: Uuid, recipient: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND to_user = $2")
            .bind(id)
            .bind(recipient)
            .execute(&self.pg)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
