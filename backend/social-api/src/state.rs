use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::SocialStore;
use crate::providers::{ArcjetClient, ClerkProvider, IdentityProvider, Screener};

/// Everything a request handler can reach. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn SocialStore>,
    /// `None` disables the identity stage: no request ever carries an identity.
    pub identity: Option<Arc<dyn IdentityProvider>>,
    /// `None` lets every request through the screening gate.
    pub screener: Option<Arc<dyn Screener>>,
}

impl AppState {
    /// Wire the hosted providers named by `config` around `store`.
    pub fn from_config(config: AppConfig, store: Arc<dyn SocialStore>) -> anyhow::Result<Self> {
        let identity = ClerkProvider::from_config(&config.clerk)
            .map(|p| Arc::new(p) as Arc<dyn IdentityProvider>);
        if identity.is_none() {
            tracing::warn!("CLERK_SECRET_KEY not set; all protected routes will answer 401");
        }

        let screener = ArcjetClient::from_config(&config.arcjet)?
            .map(|c| Arc::new(c) as Arc<dyn Screener>);
        if screener.is_none() {
            tracing::warn!("ARCJET_KEY not set; request screening is disabled");
        }

        Ok(Self {
            config: Arc::new(config),
            store,
            identity,
            screener,
        })
    }
}
