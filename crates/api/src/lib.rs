//! HTTP API: request authentication, scope authorization, and router wiring.

pub mod app;
pub mod authz;
pub mod config;
pub mod middleware;
