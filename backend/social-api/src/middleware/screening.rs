use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE, HOST},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio::time::timeout;

use crate::providers::{Decision, DenyReason, ScreeningRequest};
use crate::AppState;

/// Ask the screening service about the request before any route runs.
///
/// Service errors and timeouts let the request through.
pub async fn screen_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(screener) = state.screener.clone() else {
        return next.run(request).await;
    };

    let details = screening_details(&request);
    let budget = Duration::from_millis(state.config.arcjet.timeout_ms);

    match timeout(budget, screener.screen(&details)).await {
        Ok(Ok(Decision::Deny(reason))) => {
            tracing::warn!(
                ip = %details.ip,
                path = %details.path,
                reason = ?reason,
                "Request denied by screening"
            );
            return denial(reason);
        }
        Ok(Ok(Decision::Allow { spoofed_bot: true })) => {
            tracing::warn!(ip = %details.ip, path = %details.path, "Spoofed bot detected");
            return rejection(
                StatusCode::FORBIDDEN,
                "Spoofed bot detected",
                "Malicious bot activity detected.",
            );
        }
        Ok(Ok(Decision::Allow { .. })) => {}
        Ok(Err(e)) => {
            tracing::warn!("Screening error (allowing request): {}", e);
        }
        Err(_) => {
            tracing::warn!(
                "Screening timeout ({}ms, allowing request)",
                budget.as_millis()
            );
        }
    }

    next.run(request).await
}

fn denial(reason: DenyReason) -> Response {
    match reason {
        DenyReason::RateLimit => rejection(
            StatusCode::TOO_MANY_REQUESTS,
            "Too Many Requests",
            "Rate limit exceeded. Please try again later.",
        ),
        DenyReason::Bot => rejection(
            StatusCode::FORBIDDEN,
            "Bot access denied",
            "Automated requests are not allowed.",
        ),
        DenyReason::Other => rejection(
            StatusCode::FORBIDDEN,
            "Forbidden",
            "Access denied by security policy.",
        ),
    }
}

fn rejection(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

fn screening_details(request: &Request) -> ScreeningRequest {
    let headers = request
        .headers()
        .iter()
        .filter(|(name, _)| **name != AUTHORIZATION && **name != COOKIE)
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect::<BTreeMap<_, _>>();

    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default()
        .to_string();

    ScreeningRequest {
        ip: client_ip(request),
        method: request.method().to_string(),
        protocol: format!("{:?}", request.version()),
        host,
        path: request.uri().path().to_string(),
        headers,
        requested: 1,
    }
}

/// The socket peer, else the last `X-Forwarded-For` hop.
///
/// Only the hop appended by the nearest proxy is trusted; earlier entries are
/// whatever the client chose to send.
fn client_ip(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.rsplit(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
