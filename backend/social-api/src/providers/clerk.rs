use std::sync::Arc;

use clerk_rs::clerk::Clerk;
use clerk_rs::validators::authorizer::validate_jwt;
use clerk_rs::validators::jwks::MemoryCacheJwksProvider;
use clerk_rs::ClerkConfiguration;
use serde::Deserialize;

use super::{Identity, IdentityProvider, ProviderError, ProviderProfile};
use crate::config::ClerkConfig;

/// Clerk-backed identity provider.
///
/// Session tokens are checked against the instance JWKS, which the
/// `MemoryCacheJwksProvider` fetches once and keeps for an hour. Profiles come
/// from the Backend API.
pub struct ClerkProvider {
    jwks: Arc<MemoryCacheJwksProvider>,
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
}

impl ClerkProvider {
    /// `None` when no secret key is configured.
    pub fn from_config(config: &ClerkConfig) -> Option<Self> {
        let secret_key = config.secret_key.clone()?;
        let clerk = Clerk::new(ClerkConfiguration::new(
            None,
            None,
            Some(secret_key.clone()),
            None,
        ));

        Some(Self {
            jwks: Arc::new(MemoryCacheJwksProvider::new(clerk)),
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            secret_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ClerkEmailAddress {
    id: String,
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct ClerkUser {
    #[serde(default)]
    email_addresses: Vec<ClerkEmailAddress>,
    primary_email_address_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
}

impl ClerkUser {
    fn into_profile(self) -> Result<ProviderProfile, ProviderError> {
        let primary = self.primary_email_address_id.as_deref();
        let email = self
            .email_addresses
            .iter()
            .find(|e| Some(e.id.as_str()) == primary)
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.clone())
            .ok_or_else(|| ProviderError::Profile("user has no email address".into()))?;

        Ok(ProviderProfile {
            email,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for ClerkProvider {
    async fn verify(&self, token: &str) -> Result<Identity, ProviderError> {
        let jwt = validate_jwt(token, self.jwks.clone())
            .await
            .map_err(|e| ProviderError::Verification(e.to_string()))?;

        Ok(Identity { user_id: jwt.sub })
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<ProviderProfile, ProviderError> {
        let url = format!("{}/users/{}", self.api_url, urlencoding::encode(user_id));
        let user: ClerkUser = self
            .http
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        user.into_profile()
    }
}
