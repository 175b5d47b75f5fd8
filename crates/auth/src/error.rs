//! Authentication and authorization error model.
//!
//! Every variant carries enough detail for diagnostic logging. None of it is
//! meant for callers: the API layer collapses all [`AuthError`]s into a single
//! 401 and all [`AuthzError`]s into a single 403.

use thiserror::Error;

use crate::ClaimError;

/// Token verification failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no token presented")]
    MissingToken,

    #[error("key set is invalid: {0}")]
    KeySetInvalid(String),

    #[error("token is malformed: {0}")]
    TokenMalformed(String),

    #[error("no signing key with kid '{0}'")]
    UnknownSigningKey(String),

    #[error("token signature does not verify")]
    SignatureInvalid,

    #[error("claim check failed: {0}")]
    ClaimInvalid(#[from] ClaimError),
}

impl AuthError {
    /// Stable label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::KeySetInvalid(_) => "key_set_invalid",
            Self::TokenMalformed(_) => "token_malformed",
            Self::UnknownSigningKey(_) => "unknown_signing_key",
            Self::SignatureInvalid => "signature_invalid",
            Self::ClaimInvalid(_) => "claim_invalid",
        }
    }
}

/// Scope authorization failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("insufficient scope: no grant ends with '{required}'")]
    InsufficientScope { required: String },
}
