// Post service - feed reads, authoring, likes
use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::{author_map, user_for_identity};
use crate::db::SocialStore;
use crate::error::{AppError, Result};
use crate::models::{CommentView, CreatePostRequest, NewNotification, NewPost, Post, PostView};
use crate::providers::Identity;

pub struct PostService {
    store: Arc<dyn SocialStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<PostView>> {
        let posts = self.store.list_posts(None).await?;
        self.hydrate(posts).await
    }

    pub async fn get(&self, post_id: Uuid) -> Result<PostView> {
        let post = self
            .store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        self.hydrate(vec![post])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    pub async fn by_username(&self, username: &str) -> Result<Vec<PostView>> {
        let user = self
            .store
            .user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let posts = self.store.list_posts(Some(user.id)).await?;
        self.hydrate(posts).await
    }

    pub async fn create(&self, identity: &Identity, request: CreatePostRequest) -> Result<Post> {
        if request.is_empty() {
            return Err(AppError::BadRequest(
                "Post must contain either text or image".to_string(),
            ));
        }
        request.validate()?;

        let user = user_for_identity(self.store.as_ref(), &identity.user_id).await?;

        let post = self
            .store
            .insert_post(NewPost {
                user_id: user.id,
                content: request.content().to_string(),
                image: request.image().to_string(),
            })
            .await?;

        tracing::info!(post_id = %post.id, user_id = %user.id, "Post created");

        Ok(post)
    }

    /// Like the post, or unlike it when already liked. Returns whether the
    /// post is now liked by the user.
    pub async fn toggle_like(&self, identity: &Identity, post_id: Uuid) -> Result<bool> {
        let user = self.store.user_by_clerk_id(&identity.user_id).await?;
        let post = self.store.post_by_id(post_id).await?;
        let (Some(user), Some(post)) = (user, post) else {
            return Err(AppError::NotFound("User or post not found".to_string()));
        };

        let liked = !post.is_liked_by(user.id);
        self.store.set_post_like(post.id, user.id, liked).await?;

        if liked && post.user_id != user.id {
            self.store
                .insert_notification(NewNotification::like(user.id, post.user_id, post.id))
                .await?;
        }

        Ok(liked)
    }

    pub async fn delete(&self, identity: &Identity, post_id: Uuid) -> Result<()> {
        let user = self.store.user_by_clerk_id(&identity.user_id).await?;
        let post = self.store.post_by_id(post_id).await?;
        let (Some(user), Some(post)) = (user, post) else {
            return Err(AppError::NotFound("User or post not found".to_string()));
        };

        if post.user_id != user.id {
            return Err(AppError::Forbidden(
                "You can only delete your own posts".to_string(),
            ));
        }

        self.store.delete_post(post.id).await?;
        tracing::info!(post_id = %post.id, "Post deleted");

        Ok(())
    }

    /// Attach authors and comments (with their authors) to each post.
    async fn hydrate(&self, posts: Vec<Post>) -> Result<Vec<PostView>> {
        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let comments = self.store.comments_for_posts(&post_ids).await?;

        let authors = author_map(
            self.store.as_ref(),
            posts
                .iter()
                .map(|p| p.user_id)
                .chain(comments.iter().map(|c| c.user_id)),
        )
        .await?;

        let mut comments_by_post: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
        for comment in comments {
            if let Some(author) = authors.get(&comment.user_id) {
                comments_by_post
                    .entry(comment.post_id)
                    .or_default()
                    .push(CommentView::new(comment, author.clone()));
            }
        }

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let author = authors.get(&post.user_id)?.clone();
                let comments = comments_by_post.remove(&post.id).unwrap_or_default();
                Some(PostView::new(post, author, comments))
            })
            .collect())
    }
}
