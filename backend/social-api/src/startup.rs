//! The one startup path: load environment, connect the store, build the
//! router, listen.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::db::{Database, SocialStore};
use crate::error::StartupError;
use crate::server::{build_router, shutdown_signal};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    EnvLoaded,
    StoreConnected,
    Listening,
    Failed,
}

/// Side effects of startup: opening the store and the socket.
#[async_trait]
pub trait Launch: Send + Sync {
    type Listener: Send;

    async fn connect(&self, url: &str, config: &AppConfig) -> anyhow::Result<Arc<dyn SocialStore>>;

    async fn bind(&self, addr: &str) -> Result<Self::Listener, StartupError>;

    /// Serve until shutdown.
    async fn serve(&self, listener: Self::Listener, app: Router) -> Result<(), StartupError>;
}

/// Postgres pool plus a real TCP listener with graceful shutdown.
pub struct Production;

#[async_trait]
impl Launch for Production {
    type Listener = TcpListener;

    async fn connect(&self, url: &str, config: &AppConfig) -> anyhow::Result<Arc<dyn SocialStore>> {
        let db = Database::connect(url, &config.database).await?;
        db.run_migrations().await?;
        Ok(Arc::new(db))
    }

    async fn bind(&self, addr: &str) -> Result<TcpListener, StartupError> {
        TcpListener::bind(addr)
            .await
            .map_err(|source| StartupError::Bind {
                addr: addr.to_string(),
                source,
            })
    }

    async fn serve(&self, listener: TcpListener, app: Router) -> Result<(), StartupError> {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
    }
}

pub struct Startup<L: Launch> {
    launcher: L,
    phase: Phase,
}

impl<L: Launch> Startup<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drive startup to `Listening` and serve until shutdown. Any error
    /// leaves the machine in `Failed`.
    pub async fn run(
        &mut self,
        load: impl FnOnce() -> anyhow::Result<AppConfig>,
    ) -> Result<(), StartupError> {
        let result = self.advance(load).await;
        if let Err(e) = &result {
            self.phase = Phase::Failed;
            tracing::error!("Startup failed: {}", e);
        }
        result
    }

    async fn advance(
        &mut self,
        load: impl FnOnce() -> anyhow::Result<AppConfig>,
    ) -> Result<(), StartupError> {
        let config = load().map_err(StartupError::Config)?;
        self.phase = Phase::EnvLoaded;
        tracing::info!(environment = %config.environment, "Configuration loaded");

        let url = config
            .database
            .url
            .clone()
            .ok_or(StartupError::MissingDatabaseUrl)?;

        let store = self
            .launcher
            .connect(&url, &config)
            .await
            .map_err(StartupError::Connect)?;
        self.phase = Phase::StoreConnected;
        tracing::info!("Store connected");

        let addr = config.listen_addr();
        let state = AppState::from_config(config, store).map_err(StartupError::Config)?;
        let app = build_router(state);

        let listener = self.launcher.bind(&addr).await?;
        self.phase = Phase::Listening;
        tracing::info!("Server listening on {}", addr);

        self.launcher.serve(listener, app).await
    }
}
