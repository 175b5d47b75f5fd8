use axum::{Router, routing::get};

pub mod system;

/// Version prefix of every protected route.
pub const API_VERSION_PREFIX: &str = "/v1";

/// Default protected routes served by the binary.
pub fn router() -> Router {
    Router::new().route(&format!("{API_VERSION_PREFIX}/session"), get(system::session))
}
