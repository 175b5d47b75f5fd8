//! HTTP application wiring (Axum router + auth layers).
//!
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use axum::{Router, routing::get};
use tower::ServiceBuilder;

use apigate_auth::AuthenticatorConfig;

use crate::{authz, middleware};

pub mod errors;
pub mod routes;

/// Build the full HTTP router.
///
/// `protected` holds the versioned routes (`/v1/...`); each is guarded by the
/// scope check. The authenticator wraps everything, so it runs first and the
/// scope check only ever sees verified callers. `GET /` stays open.
///
/// `protected` must contain at least one route.
pub fn build_app(config: AuthenticatorConfig, protected: Router) -> Router {
    let auth_state = middleware::AuthState::new(config);

    let protected = protected.route_layer(axum::middleware::from_fn(authz::scope_middleware));

    Router::new()
        .route("/", get(routes::system::root))
        .merge(protected)
        .layer(
            ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            )),
        )
}
