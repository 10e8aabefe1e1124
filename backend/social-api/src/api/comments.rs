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
use crate::models::CreateCommentRequest;
use crate::providers::Identity;
use crate::services::CommentService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/post/:post_id", post(create_comment))
        .route("/:comment_id", delete(delete_comment))
        .route_layer(from_fn(require_auth));

    Router::new()
        .route("/post/:post_id", get(post_comments))
        .merge(protected)
}

async fn post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post_id = parse_id(&post_id, "post")?;
    let comments = CommentService::new(state.store.clone())
        .for_post(post_id)
        .await?;
    Ok(Json(json!({ "comments": comments })))
}

async fn create_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<String>,
    JsonBody(request): JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let post_id = parse_id(&post_id, "post")?;
    let comment = CommentService::new(state.store.clone())
        .create(&identity, post_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "comment": comment }))))
}

async fn delete_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    let comment_id = parse_id(&comment_id, "comment")?;
    CommentService::new(state.store.clone())
        .delete(&identity, comment_id)
        .await?;
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
