use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use apigate_auth::{AuthenticatorConfig, authenticate};

use crate::app::errors::json_error;

/// Header carrying the token. Not `Authorization`: clients send the raw
/// token under this name.
pub const AUTH_HEADER: &str = "Authentication";

/// Path left open for liveness probes.
pub const ROOT_PATH: &str = "/";

pub const NOT_AUTHORIZED: &str = "Not authorized";

#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AuthenticatorConfig>,
}

impl AuthState {
    pub fn new(config: AuthenticatorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Verifies the request's token and attaches the caller's
/// [`apigate_auth::RequestAuthContext`] to the request extensions.
///
/// Every failure yields the same 401 body; the reason is only logged.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if req.uri().path() == ROOT_PATH {
        return next.run(req).await;
    }

    let token = extract_token(req.headers());

    match authenticate(&state.config, token, Utc::now()) {
        Ok(ctx) => {
            tracing::debug!(client_id = ctx.client_id(), "request authenticated");
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(
                kind = err.kind(),
                error = %err,
                path = req.uri().path(),
                "request not authenticated"
            );
            json_error(StatusCode::UNAUTHORIZED, NOT_AUTHORIZED)
        }
    }
}

/// Raw value of the auth header; absent or non-UTF-8 values read as empty.
fn extract_token(headers: &HeaderMap) -> &str {
    headers
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
