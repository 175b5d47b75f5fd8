use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claim names read by the verifier.
pub const ISSUER: &str = "iss";
pub const SUBJECT: &str = "sub";
pub const EXPIRES_AT: &str = "exp";
pub const ISSUED_AT: &str = "iat";
pub const NOT_BEFORE: &str = "nbf";
pub const TOKEN_USE: &str = "token_use";
pub const CLIENT_ID: &str = "client_id";
pub const SCOPE: &str = "scope";

/// The only `token_use` value accepted on inbound requests.
pub const ACCESS_TOKEN_USE: &str = "access";

/// Access token claim set.
///
/// Every field is optional at the parsing stage so that a missing claim is
/// reported by [`validate_claims`] as a claim failure rather than as a
/// malformed token. Claims not listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer; must equal the configured issuer exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject; must equal `client_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued-at time (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not-before time (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_use: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Space-delimited granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClaimError {
    #[error("token_use is not 'access'")]
    WrongTokenUse,

    #[error("issuer does not match")]
    IssuerMismatch,

    #[error("client_id is missing")]
    MissingClientId,

    #[error("subject does not match client_id")]
    SubjectMismatch,

    #[error("exp is missing")]
    MissingExpiry,

    #[error("token has expired")]
    Expired,

    #[error("token issued in the future")]
    IssuedInFuture,

    #[error("token not yet valid")]
    NotYetValid,
}

impl ClaimError {
    /// Name of the claim that failed the check.
    pub fn claim(&self) -> &'static str {
        match self {
            Self::WrongTokenUse => TOKEN_USE,
            Self::IssuerMismatch => ISSUER,
            Self::MissingClientId => CLIENT_ID,
            Self::SubjectMismatch => SUBJECT,
            Self::MissingExpiry | Self::Expired => EXPIRES_AT,
            Self::IssuedInFuture => ISSUED_AT,
            Self::NotYetValid => NOT_BEFORE,
        }
    }
}

/// Deterministically validate access token claims.
///
/// Checks run in a fixed order and the first failure is returned. There is no
/// clock-skew leeway: `exp` must be strictly after `now`, and `iat`/`nbf`
/// must not be after it.
pub fn validate_claims(
    claims: &AccessClaims,
    expected_issuer: &str,
    now: DateTime<Utc>,
) -> Result<(), ClaimError> {
    if claims.token_use.as_deref() != Some(ACCESS_TOKEN_USE) {
        return Err(ClaimError::WrongTokenUse);
    }
    if claims.iss.as_deref() != Some(expected_issuer) {
        return Err(ClaimError::IssuerMismatch);
    }

    let client_id = match claims.client_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ClaimError::MissingClientId),
    };
    if claims.sub.as_deref() != Some(client_id) {
        return Err(ClaimError::SubjectMismatch);
    }

    let now = now.timestamp();
    let exp = claims.exp.ok_or(ClaimError::MissingExpiry)?;
    if exp <= now {
        return Err(ClaimError::Expired);
    }
    if claims.iat.is_some_and(|iat| iat > now) {
        return Err(ClaimError::IssuedInFuture);
    }
    if claims.nbf.is_some_and(|nbf| nbf > now) {
        return Err(ClaimError::NotYetValid);
    }

    Ok(())
}
