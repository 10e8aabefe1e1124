//! Shared fixtures for the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request},
    response::Response,
};
use serde_json::Value;

use crate::config::AppConfig;
use crate::db::SocialStore;
use crate::models::{NewUser, User};
use crate::providers::{
    Decision, Identity, IdentityProvider, ProviderError, ProviderProfile, Screener,
    ScreeningError, ScreeningRequest,
};
use crate::AppState;

pub const REJECTED_TOKEN: &str = "invalid";

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// An API request, signed in as `token` when given.
pub fn api_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// State over `store` with the stub identity provider and no screener.
pub fn test_state(store: Arc<dyn SocialStore>) -> AppState {
    let env = config::Environment::default().source(Some(HashMap::new()));
    AppState {
        config: Arc::new(AppConfig::from_env(env).unwrap()),
        store,
        identity: Some(Arc::new(StubIdentity::new())),
        screener: None,
    }
}

/// A user whose clerk id and username are both `name`.
pub async fn seed_user(store: &dyn SocialStore, name: &str) -> User {
    store
        .insert_user(NewUser {
            clerk_id: name.to_string(),
            email: format!("{name}@example.com"),
            first_name: name.to_string(),
            last_name: String::new(),
            username: name.to_string(),
            profile_picture: String::new(),
        })
        .await
        .unwrap()
}

/// Accepts any token except [`REJECTED_TOKEN`] as the user id it names.
#[derive(Default)]
pub struct StubIdentity;

impl StubIdentity {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl IdentityProvider for StubIdentity {
    async fn verify(&self, token: &str) -> Result<Identity, ProviderError> {
        if token == REJECTED_TOKEN {
            return Err(ProviderError::Verification("token rejected".into()));
        }
        Ok(Identity {
            user_id: token.to_string(),
        })
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<ProviderProfile, ProviderError> {
        Ok(ProviderProfile {
            email: format!("{user_id}@example.com"),
            first_name: "Test".into(),
            last_name: "User".into(),
            image_url: String::new(),
        })
    }
}

/// Returns a fixed outcome and remembers the last request it saw.
pub struct StubScreener {
    outcome: Result<Decision, String>,
    delay: Option<Duration>,
    last: Mutex<Option<ScreeningRequest>>,
}

impl StubScreener {
    pub fn deciding(decision: Decision) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(decision),
            delay: None,
            last: Mutex::new(None),
        })
    }

    pub fn failing(error: ScreeningError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error.to_string()),
            delay: None,
            last: Mutex::new(None),
        })
    }

    /// Allows, but only after sleeping for `delay`.
    pub fn stalling(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(Decision::allow()),
            delay: Some(delay),
            last: Mutex::new(None),
        })
    }

    pub fn last_request(&self) -> Option<ScreeningRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Screener for StubScreener {
    async fn screen(&self, request: &ScreeningRequest) -> Result<Decision, ScreeningError> {
        *self.last.lock().unwrap() = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map_err(ScreeningError::Service)
    }
}
