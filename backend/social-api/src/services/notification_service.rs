use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::{author_map, user_for_identity};
use crate::db::SocialStore;
use crate::error::{AppError, Result};
use crate::models::{CommentSnippet, NotificationView, PostSnippet};
use crate::providers::Identity;

pub struct NotificationService {
    store: Arc<dyn SocialStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// The caller's notifications, newest first, with sender and the
    /// referenced post/comment resolved.
    pub async fn for_user(&self, identity: &Identity) -> Result<Vec<NotificationView>> {
        let user = user_for_identity(self.store.as_ref(), &identity.user_id).await?;
        let notifications = self.store.notifications_for(user.id).await?;

        let senders = author_map(
            self.store.as_ref(),
            notifications.iter().map(|n| n.from_user),
        )
        .await?;

        let post_ids: Vec<Uuid> = notifications.iter().filter_map(|n| n.post_id).collect();
        let posts: HashMap<Uuid, PostSnippet> = self
            .store
            .posts_by_ids(&post_ids)
            .await?
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    PostSnippet {
                        id: p.id,
                        content: p.content,
                        image: p.image,
                    },
                )
            })
            .collect();

        let comment_ids: Vec<Uuid> = notifications.iter().filter_map(|n| n.comment_id).collect();
        let comments: HashMap<Uuid, CommentSnippet> = self
            .store
            .comments_by_ids(&comment_ids)
            .await?
            .into_iter()
            .map(|c| {
                (
                    c.id,
                    CommentSnippet {
                        id: c.id,
                        content: c.content,
                    },
                )
            })
            .collect();

        Ok(notifications
            .into_iter()
            .filter_map(|n| {
                let from = senders.get(&n.from_user)?.clone();
                Some(NotificationView {
                    id: n.id,
                    from,
                    to: n.to_user,
                    kind: n.kind,
                    post: n.post_id.and_then(|id| posts.get(&id).cloned()),
                    comment: n.comment_id.and_then(|id| comments.get(&id).cloned()),
                    created_at: n.created_at,
                })
            })
            .collect())
    }

    /// Only the recipient may delete a notification.
    pub async fn delete(&self, identity: &Identity, notification_id: Uuid) -> Result<()> {
        let user = user_for_identity(self.store.as_ref(), &identity.user_id).await?;

        if !self
            .store
            .delete_notification(notification_id, user.id)
            .await?
        {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::{NewComment, NewNotification, NewPost, NotificationKind};
    use crate::test_support::seed_user;

    fn identity(clerk_id: &str) -> Identity {
        Identity {
            user_id: clerk_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_notifications_are_populated() {
        let store = Arc::new(MemoryStore::new());
        let ada = seed_user(store.as_ref(), "ada").await;
        let bob = seed_user(store.as_ref(), "bob").await;
        let post = store
            .insert_post(NewPost {
                user_id: ada.id,
                content: "hello".into(),
                image: String::new(),
            })
            .await
            .unwrap();
        let comment = store
            .insert_comment(NewComment {
                user_id: bob.id,
                post_id: post.id,
                content: "nice".into(),
            })
            .await
            .unwrap();
        store
            .insert_notification(NewNotification::follow(bob.id, ada.id))
            .await
            .unwrap();
        store
            .insert_notification(NewNotification::comment(bob.id, ada.id, post.id, comment.id))
            .await
            .unwrap();

        let service = NotificationService::new(store);
        let views = service.for_user(&identity("ada")).await.unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].kind, NotificationKind::Comment);
        assert_eq!(views[0].from.username, "bob");
        assert_eq!(views[0].post.as_ref().map(|p| p.content.as_str()), Some("hello"));
        assert_eq!(views[0].comment.as_ref().map(|c| c.content.as_str()), Some("nice"));
        assert_eq!(views[1].kind, NotificationKind::Follow);
        assert!(views[1].post.is_none());
    }

    #[tokio::test]
    async fn test_only_recipient_can_delete() {
        let store = Arc::new(MemoryStore::new());
        let ada = seed_user(store.as_ref(), "ada").await;
        let bob = seed_user(store.as_ref(), "bob").await;
        let notification = store
            .insert_notification(NewNotification::follow(bob.id, ada.id))
            .await
            .unwrap();
        let service = NotificationService::new(store.clone());

        let err = service
            .delete(&identity("bob"), notification.id)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Notification not found");

        service.delete(&identity("ada"), notification.id).await.unwrap();
        assert!(store.notifications_for(ada.id).await.unwrap().is_empty());
    }
}
