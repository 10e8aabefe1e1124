// Comment service
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::author_map;
use crate::db::SocialStore;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentView, CreateCommentRequest, NewComment, NewNotification};
use crate::providers::Identity;

pub struct CommentService {
    store: Arc<dyn SocialStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    pub async fn for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        let comments = self.store.comments_for_posts(&[post_id]).await?;
        let authors = author_map(self.store.as_ref(), comments.iter().map(|c| c.user_id)).await?;

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.user_id)?.clone();
                Some(CommentView::new(comment, author))
            })
            .collect())
    }

    pub async fn create(
        &self,
        identity: &Identity,
        post_id: Uuid,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        let content = request
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::BadRequest("Comment content is required".to_string()))?
            .to_string();
        request.validate()?;

        let user = self.store.user_by_clerk_id(&identity.user_id).await?;
        let post = self.store.post_by_id(post_id).await?;
        let (Some(user), Some(post)) = (user, post) else {
            return Err(AppError::NotFound("User or post not found".to_string()));
        };

        let comment = self
            .store
            .insert_comment(NewComment {
                user_id: user.id,
                post_id: post.id,
                content,
            })
            .await?;

        if post.user_id != user.id {
            self.store
                .insert_notification(NewNotification::comment(
                    user.id,
                    post.user_id,
                    post.id,
                    comment.id,
                ))
                .await?;
        }

        tracing::debug!(comment_id = %comment.id, post_id = %post.id, "Comment created");

        Ok(comment)
    }

    pub async fn delete(&self, identity: &Identity, comment_id: Uuid) -> Result<()> {
        let user = self.store.user_by_clerk_id(&identity.user_id).await?;
        let comment = self.store.comment_by_id(comment_id).await?;
        let (Some(user), Some(comment)) = (user, comment) else {
            return Err(AppError::NotFound("User or comment not found".to_string()));
        };

        if comment.user_id != user.id {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        self.store.delete_comment(comment.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::{NewPost, NotificationKind};
    use crate::test_support::seed_user;

    fn identity(clerk_id: &str) -> Identity {
        Identity {
            user_id: clerk_id.to_string(),
        }
    }

    fn body(content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            content: Some(content.to_string()),
        }
    }

    async fn seed_post(store: &MemoryStore, author: Uuid) -> Uuid {
        store
            .insert_post(NewPost {
                user_id: author,
                content: "hello".into(),
                image: String::new(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_blank_comment_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let ada = seed_user(store.as_ref(), "ada").await;
        let post_id = seed_post(&store, ada.id).await;
        let service = CommentService::new(store);

        let err = service
            .create(&identity("ada"), post_id, body("  "))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Comment content is required");

        let err = service
            .create(&identity("ada"), post_id, CreateCommentRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let store = Arc::new(MemoryStore::new());
        seed_user(store.as_ref(), "ada").await;
        let service = CommentService::new(store);

        let err = service
            .create(&identity("ada"), Uuid::new_v4(), body("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User or post not found");
    }

    #[tokio::test]
    async fn test_comment_notifies_post_author() {
        let store = Arc::new(MemoryStore::new());
        let ada = seed_user(store.as_ref(), "ada").await;
        let bob = seed_user(store.as_ref(), "bob").await;
        let post_id = seed_post(&store, ada.id).await;
        let service = CommentService::new(store.clone());

        service
            .create(&identity("ada"), post_id, body("own post"))
            .await
            .unwrap();
        assert!(store.notifications_for(ada.id).await.unwrap().is_empty());

        let comment = service
            .create(&identity("bob"), post_id, body("nice"))
            .await
            .unwrap();
        let notifications = store.notifications_for(ada.id).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Comment);
        assert_eq!(notifications[0].from_user, bob.id);
        assert_eq!(notifications[0].comment_id, Some(comment.id));

        let listed = service.for_post(post_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, comment.id);
        assert_eq!(listed[0].user.username, "bob");
    }

    #[tokio::test]
    async fn test_only_author_can_delete() {
        let store = Arc::new(MemoryStore::new());
        let ada = seed_user(store.as_ref(), "ada").await;
        seed_user(store.as_ref(), "bob").await;
        let post_id = seed_post(&store, ada.id).await;
        let service = CommentService::new(store.clone());
        let comment = service
            .create(&identity("ada"), post_id, body("mine"))
            .await
            .unwrap();

        let err = service.delete(&identity("bob"), comment.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service
            .delete(&identity("ada"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        service.delete(&identity("ada"), comment.id).await.unwrap();
        assert!(store.comment_by_id(comment.id).await.unwrap().is_none());
    }
}
