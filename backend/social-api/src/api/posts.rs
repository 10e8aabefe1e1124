use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use super::{parse_id, JsonBody};
use crate::error::Result;
use crate::middleware::require_auth;
use crate::models::CreatePostRequest;
use crate::providers::Identity;
use crate::services::PostService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_post))
        .route("/:post_id/like", post(like_post))
        .route("/:post_id", delete(delete_post))
        .route_layer(from_fn(require_auth));

    Router::new()
        .route("/", get(list_posts))
        .route("/:post_id", get(get_post))
        .route("/user/:username", get(user_posts))
        .merge(protected)
}

async fn list_posts(State(state): State<AppState>) -> Result<Json<Value>> {
    let posts = PostService::new(state.store.clone()).list().await?;
    Ok(Json(json!({ "posts": posts })))
}

async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post_id = parse_id(&post_id, "post")?;
    let post = PostService::new(state.store.clone()).get(post_id).await?;
    Ok(Json(json!({ "post": post })))
}

async fn user_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    let posts = PostService::new(state.store.clone())
        .by_username(&username)
        .await?;
    Ok(Json(json!({ "posts": posts })))
}

async fn create_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(request): JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let post = PostService::new(state.store.clone())
        .create(&identity, request)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "post": post }))))
}

async fn like_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post_id = parse_id(&post_id, "post")?;
    let liked = PostService::new(state.store.clone())
        .toggle_like(&identity, post_id)
        .await?;

    let message = if liked {
        "Post liked successfully"
    } else {
        "Post unliked successfully"
    };
    Ok(Json(json!({ "message": message })))
}

async fn delete_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post_id = parse_id(&post_id, "post")?;
    PostService::new(state.store.clone())
        .delete(&identity, post_id)
        .await?;
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
