//! Hosted services the API delegates to.
//!
//! - `clerk`: session-token verification and user profile lookup
//! - `arcjet`: bot detection, rate limiting and shield decisions

pub mod arcjet;
pub mod clerk;

use std::collections::BTreeMap;

pub use arcjet::ArcjetClient;
pub use clerk::ClerkProvider;

/// Identity attached to a request once its session token verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-side user id (`sub` claim).
    pub user_id: String,
}

/// Profile fields the provider holds for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("session verification failed: {0}")]
    Verification(String),

    #[error("identity provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("identity provider returned no usable profile: {0}")]
    Profile(String),
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, ProviderError>;

    async fn fetch_profile(&self, user_id: &str) -> Result<ProviderProfile, ProviderError>;
}

/// Request metadata handed to the screening service.
#[derive(Debug, Clone, Default)]
pub struct ScreeningRequest {
    pub ip: String,
    pub method: String,
    pub protocol: String,
    pub host: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    /// Tokens this request takes from the bucket.
    pub requested: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    RateLimit,
    Bot,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow { spoofed_bot: bool },
    Deny(DenyReason),
}

impl Decision {
    pub fn allow() -> Self {
        Decision::Allow { spoofed_bot: false }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("screening request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("screening service error: {0}")]
    Service(String),
}

#[async_trait::async_trait]
pub trait Screener: Send + Sync {
    async fn screen(&self, request: &ScreeningRequest) -> Result<Decision, ScreeningError>;
}
