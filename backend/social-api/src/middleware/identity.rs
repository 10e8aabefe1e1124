use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::AppState;

/// Cookie Clerk's frontend SDKs keep the session token in.
pub const SESSION_COOKIE: &str = "__session";

/// Verify the session token, if any, and attach the resulting `Identity`.
///
/// Never rejects: a missing or invalid token just leaves the request
/// anonymous, and the auth gate decides per route.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let (Some(provider), Some(token)) = (state.identity.as_ref(), session_token(request.headers()))
    {
        match provider.verify(&token).await {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
            }
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
            }
        }
    }

    next.run(request).await
}

/// Bearer token first, then the session cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}
