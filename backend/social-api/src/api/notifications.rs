use axum::{
    extract::{Path, State},
    middleware::from_fn,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use super::parse_id;
use crate::error::Result;
use crate::middleware::require_auth;
use crate::providers::Identity;
use crate::services::NotificationService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:notification_id", delete(delete_notification))
        .route_layer(from_fn(require_auth))
}

async fn list_notifications(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>> {
    let notifications = NotificationService::new(state.store.clone())
        .for_user(&identity)
        .await?;
    Ok(Json(json!({ "notifications": notifications })))
}

async fn delete_notification(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>> {
    let notification_id = parse_id(&notification_id, "notification")?;
    NotificationService::new(state.store.clone())
        .delete(&identity, notification_id)
        .await?;
    Ok(Json(json!({ "message": "Notification deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Method;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::db::memory::MemoryStore;
    use crate::server::build_router;
    use crate::test_support::{api_request, read_json, seed_user, test_state};

    #[tokio::test]
    async fn test_follow_shows_up_and_can_be_dismissed() {
        let store = Arc::new(MemoryStore::new());
        seed_user(store.as_ref(), "ada").await;
        let bob = seed_user(store.as_ref(), "bob").await;
        let app = build_router(test_state(store));

        app.clone()
            .oneshot(api_request(
                Method::POST,
                &format!("/api/users/follow/{}", bob.id),
                Some("ada"),
                None,
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(api_request(Method::GET, "/api/notifications", Some("bob"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = read_json(response).await;
        let first = &body["notifications"][0];
        assert_eq!(first["type"], "follow");
        assert_eq!(first["from"]["username"], "ada");
        assert_eq!(first["to"], bob.id.to_string());
        let id = first["_id"].as_str().unwrap().to_string();

        let target = format!("/api/notifications/{id}");
        let response = app
            .clone()
            .oneshot(api_request(Method::DELETE, &target, Some("ada"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(read_json(response).await, json!({ "error": "Notification not found" }));

        let response = app
            .oneshot(api_request(Method::DELETE, &target, Some("bob"), None))
            .await
            .unwrap();
        assert_eq!(
            read_json(response).await["message"],
            "Notification deleted successfully"
        );
    }

    #[tokio::test]
    async fn test_listing_requires_session() {
        let app = build_router(test_state(Arc::new(MemoryStore::new())));
        let response = app
            .oneshot(api_request(Method::GET, "/api/notifications", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
    }
}
