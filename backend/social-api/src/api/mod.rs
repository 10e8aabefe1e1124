mod comments;
mod extract;
mod notifications;
mod posts;
mod users;

use axum::Router;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::AppState;
use extract::JsonBody;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::routes())
        .nest("/posts", posts::routes())
        .nest("/comments", comments::routes())
        .nest("/notifications", notifications::routes())
}

/// Path ids arrive as strings so a malformed one gets our own 400 body.
fn parse_id(raw: &str, kind: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {kind} ID")))
}
