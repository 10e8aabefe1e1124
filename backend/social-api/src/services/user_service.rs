// User service - profiles, provider sync and the follow graph
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::user_for_identity;
use crate::db::SocialStore;
use crate::error::{AppError, Result};
use crate::models::{NewNotification, NewUser, ProfileUpdate, User};
use crate::providers::{Identity, IdentityProvider};

pub struct UserService {
    store: Arc<dyn SocialStore>,
}

/// Result of syncing a provider identity into the local user table.
#[derive(Debug)]
pub enum SyncOutcome {
    Existing(User),
    Created(User),
}

impl UserService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Public profile lookup.
    pub async fn profile(&self, username: &str) -> Result<User> {
        self.store
            .user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn current(&self, identity: &Identity) -> Result<User> {
        user_for_identity(self.store.as_ref(), &identity.user_id).await
    }

    /// Create the local user for `identity` from the provider's profile,
    /// unless it already exists.
    pub async fn sync(
        &self,
        identity: &Identity,
        provider: &dyn IdentityProvider,
    ) -> Result<SyncOutcome> {
        if let Some(user) = self.store.user_by_clerk_id(&identity.user_id).await? {
            return Ok(SyncOutcome::Existing(user));
        }

        let profile = provider
            .fetch_profile(&identity.user_id)
            .await
            .map_err(anyhow::Error::from)?;

        let user = self
            .store
            .insert_user(NewUser {
                clerk_id: identity.user_id.clone(),
                username: NewUser::username_from_email(&profile.email),
                email: profile.email,
                first_name: profile.first_name,
                last_name: profile.last_name,
                profile_picture: profile.image_url,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created from identity provider");

        Ok(SyncOutcome::Created(user))
    }

    pub async fn update_profile(&self, identity: &Identity, update: ProfileUpdate) -> Result<User> {
        update.validate()?;
        let user = self.current(identity).await?;
        self.store
            .update_profile(user.id, update)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Follow `target_id`, or unfollow when already following. Returns
    /// whether the user now follows the target.
    pub async fn toggle_follow(&self, identity: &Identity, target_id: Uuid) -> Result<bool> {
        let current = self.store.user_by_clerk_id(&identity.user_id).await?;
        if current.as_ref().map(|u| u.id) == Some(target_id) {
            return Err(AppError::BadRequest("You cannot follow yourself".to_string()));
        }

        let target = self.store.user_by_id(target_id).await?;
        let (Some(current), Some(target)) = (current, target) else {
            return Err(AppError::NotFound("User not found".to_string()));
        };

        let follow = !current.is_following(target.id);
        self.store.set_following(current.id, target.id, follow).await?;

        if follow {
            self.store
                .insert_notification(NewNotification::follow(current.id, target.id))
                .await?;
        }

        Ok(follow)
    }
}
