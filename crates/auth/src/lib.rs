//! `apigate-auth`: bearer token verification and scope authorization.
//!
//! This crate is intentionally decoupled from HTTP: it works on raw header
//! values and request paths, and the API layer maps its errors to responses.

pub mod claims;
pub mod error;
pub mod jwks;
pub mod scope;
pub mod verifier;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use claims::{AccessClaims, ClaimError, validate_claims};
pub use error::{AuthError, AuthzError};
pub use jwks::KeySet;
pub use scope::{authorize, required_permission};
pub use verifier::{AuthenticatorConfig, RequestAuthContext, authenticate};
