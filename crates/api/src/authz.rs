//! Route-scope guard.
//!
//! Runs after [`crate::middleware::auth_middleware`] on versioned routes and
//! checks the caller's granted scopes against the permission the path requires.

use axum::{extract::OriginalUri, http::StatusCode, middleware::Next, response::Response};

use apigate_auth::{RequestAuthContext, authorize};

use crate::app::errors::json_error;

pub const FORBIDDEN: &str = "Forbidden";

pub async fn scope_middleware(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    // Nested routers see a stripped URI; the permission is derived from the full path.
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let granted = req
        .extensions()
        .get::<RequestAuthContext>()
        .map(RequestAuthContext::scope)
        .unwrap_or_default();

    match authorize(&path, granted) {
        Ok(()) => next.run(req).await,
        Err(err) => {
            tracing::debug!(error = %err, path = %path, "request not authorized for route");
            json_error(StatusCode::FORBIDDEN, FORBIDDEN)
        }
    }
}
