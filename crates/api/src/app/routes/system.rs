use axum::{Extension, Json, response::IntoResponse};
use serde_json::json;

use apigate_auth::RequestAuthContext;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Hello, welcome to the API",
    }))
}

/// Echoes the verified caller. Requires the `session` scope.
pub async fn session(Extension(ctx): Extension<RequestAuthContext>) -> impl IntoResponse {
    Json(json!({
        "client_id": ctx.client_id(),
        "scopes": ctx.scopes().filter(|s| !s.is_empty()).collect::<Vec<_>>(),
    }))
}
