use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;

use super::{parse_id, JsonBody};
use crate::error::{AppError, Result};
use crate::middleware::require_auth;
use crate::models::{ProfileUpdate, User};
use crate::providers::Identity;
use crate::services::{SyncOutcome, UserService};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/sync", post(sync_user))
        .route("/me", post(current_user))
        .route("/profile", put(update_profile))
        .route("/follow/:target_user_id", post(follow_user))
        .route_layer(from_fn(require_auth));

    Router::new()
        .route("/profile/:username", get(get_profile))
        .merge(protected)
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub user: User,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = UserService::new(state.store.clone()).profile(&username).await?;
    Ok(Json(UserResponse { user }))
}

async fn sync_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<(StatusCode, Json<SyncResponse>)> {
    let provider = state.identity.clone().ok_or(AppError::Unauthorized)?;
    let outcome = UserService::new(state.store.clone())
        .sync(&identity, provider.as_ref())
        .await?;

    Ok(match outcome {
        SyncOutcome::Existing(user) => (
            StatusCode::OK,
            Json(SyncResponse {
                user,
                message: "User already exists",
            }),
        ),
        SyncOutcome::Created(user) => (
            StatusCode::CREATED,
            Json(SyncResponse {
                user,
                message: "User created successfully",
            }),
        ),
    })
}

async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserResponse>> {
    let user = UserService::new(state.store.clone()).current(&identity).await?;
    Ok(Json(UserResponse { user }))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Result<Json<UserResponse>> {
    let user = UserService::new(state.store.clone())
        .update_profile(&identity, update)
        .await?;
    Ok(Json(UserResponse { user }))
}

async fn follow_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(target_user_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let target_id = parse_id(&target_user_id, "user")?;
    let following = UserService::new(state.store.clone())
        .toggle_follow(&identity, target_id)
        .await?;

    let message = if following {
        "User followed successfully"
    } else {
        "User unfollowed successfully"
    };
    Ok(Json(MessageResponse { message }))
}
