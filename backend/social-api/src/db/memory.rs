//! In-process store used by the unit tests.

use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::SocialStore;
use crate::models::{
    Comment, NewComment, NewNotification, NewPost, NewUser, Notification, Post, ProfileUpdate,
    User,
};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    /// Each insert gets a strictly later timestamp so newest-first ordering
    /// is deterministic.
    clock: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now(&self) -> DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        DateTime::from_timestamp(1_700_000_000 + tick, 0).unwrap_or_default()
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

#[async_trait::async_trait]
impl SocialStore for MemoryStore {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_clerk_id(&self, clerk_id: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.clerk_id == clerk_id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| {
            u.clerk_id == user.clerk_id || u.email == user.email || u.username == user.username
        }) {
            bail!("duplicate key value violates unique constraint on users");
        }

        let now = self.now();
        let user = User {
            id: Uuid::new_v4(),
            clerk_id: user.clerk_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            profile_picture: user.profile_picture,
            banner_image: String::new(),
            bio: String::new(),
            location: String::new(),
            followers: Vec::new(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>> {
        let now = self.now();
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        apply_profile(update, user);
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn set_following(&self, follower: Uuid, target: Uuid, follow: bool) -> Result<()> {
        let mut inner = self.inner.write().await;
        for user in inner.users.iter_mut() {
            let (list, other) = if user.id == follower {
                (&mut user.following, target)
            } else if user.id == target {
                (&mut user.followers, follower)
            } else {
                continue;
            };

            if follow {
                if !list.contains(&other) {
                    list.push(other);
                }
            } else {
                list.retain(|id| *id != other);
            }
        }
        Ok(())
    }

    async fn list_posts(&self, author: Option<Uuid>) -> Result<Vec<Post>> {
        let inner = self.inner.read().await;
        let mut posts: Vec<Post> = inner
            .posts
            .iter()
            .filter(|p| author.map_or(true, |a| p.user_id == a))
            .cloned()
            .collect();
        newest_first(&mut posts, |p| p.created_at);
        Ok(posts)
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let now = self.now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            content: post.content,
            image: post.image,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.posts.push(post.clone());
        Ok(post)
    }

    async fn set_post_like(&self, post_id: Uuid, user_id: Uuid, liked: bool) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(post) = inner.posts.iter_mut().find(|p| p.id == post_id) {
            if liked {
                if !post.likes.contains(&user_id) {
                    post.likes.push(user_id);
                }
            } else {
                post.likes.retain(|id| *id != user_id);
            }
        }
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.comments.retain(|c| c.post_id != id);
        inner.posts.retain(|p| p.id != id);
        Ok(())
    }

    async fn comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>> {
        let inner = self.inner.read().await;
        let mut comments: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect();
        newest_first(&mut comments, |c| c.created_at);
        Ok(comments)
    }

    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let inner = self.inner.read().await;
        Ok(inner.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn comments_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Comment>> {
        let inner = self.inner.read().await;
        Ok(inner
            .comments
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let now = self.now();
        let comment = Comment {
            id: Uuid::new_v4(),
            user_id: comment.user_id,
            post_id: comment.post_id,
            content: comment.content,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<()> {
        self.inner.write().await.comments.retain(|c| c.id != id);
        Ok(())
    }

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            from_user: notification.from_user,
            to_user: notification.to_user,
            kind: notification.kind,
            post_id: notification.post_id,
            comment_id: notification.comment_id,
            created_at: self.now(),
        };
        self.inner
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(notification)
    }

    async fn notifications_for(&self, recipient: Uuid) -> Result<Vec<Notification>> {
        let inner = self.inner.read().await;
        let mut notifications: Vec<Notification> = inner
            .notifications
            .iter()
            .filter(|n| n.to_user == recipient)
            .cloned()
            .collect();
        newest_first(&mut notifications, |n| n.created_at);
        Ok(notifications)
    }

    async fn delete_notification(&self, id: Uuid, recipient: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.notifications.len();
        inner
            .notifications
            .retain(|n| !(n.id == id && n.to_user == recipient));
        Ok(inner.notifications.len() != before)
    }
}

/// Overwrite only the fields the update carries.
fn apply_profile(update: ProfileUpdate, user: &mut User) {
    if let Some(v) = update.first_name {
        user.first_name = v;
    }
    if let Some(v) = update.last_name {
        user.last_name = v;
    }
    if let Some(v) = update.bio {
        user.bio = v;
    }
    if let Some(v) = update.location {
        user.location = v;
    }
    if let Some(v) = update.profile_picture {
        user.profile_picture = v;
    }
    if let Some(v) = update.banner_image {
        user.banner_image = v;
    }
}
