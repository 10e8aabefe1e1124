use axum::{extract::State, middleware::from_fn_with_state, routing::get, Router};
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::api;
use crate::middleware::{attach_identity, panic_response, screen_request};
use crate::AppState;

/// The full HTTP surface: `GET /` plus the API under `/api`.
pub fn build_router(state: AppState) -> Router {
    assemble(state, api::routes())
}

fn assemble(state: AppState, api: Router<AppState>) -> Router {
    // Layers run bottom-up: identity is attached before screening sees the request.
    let api = Router::new()
        .nest("/api", api)
        .layer(from_fn_with_state(state.clone(), screen_request))
        .layer(from_fn_with_state(state.clone(), attach_identity));

    Router::new()
        .route("/", get(root))
        .merge(api)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> String {
    format!(
        "🚀 Hello from server (Running on localhost:{})",
        state.config.server.port
    )
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutting down gracefully...");
}
