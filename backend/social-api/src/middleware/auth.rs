use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::providers::Identity;

/// Per-route gate: 401 unless the identity stage attached an `Identity`.
pub async fn require_auth(request: Request, next: Next) -> Response {
    if request.extensions().get::<Identity>().is_none() {
        return AppError::Unauthorized.into_response();
    }

    next.run(request).await
}
