mod comment_service;
mod notification_service;
mod post_service;
mod user_service;

pub use comment_service::CommentService;
pub use notification_service::NotificationService;
pub use post_service::PostService;
pub use user_service::{SyncOutcome, UserService};

use std::collections::HashMap;

use uuid::Uuid;

use crate::db::SocialStore;
use crate::error::{AppError, Result};
use crate::models::{AuthorSummary, User};

/// Resolve author summaries for a set of user ids in one lookup.
async fn author_map(
    store: &dyn SocialStore,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, AuthorSummary>> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let users = store.users_by_ids(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u.summary())).collect())
}

/// The local user record behind a provider identity.
async fn user_for_identity(store: &dyn SocialStore, clerk_id: &str) -> Result<User> {
    store
        .user_by_clerk_id(clerk_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
