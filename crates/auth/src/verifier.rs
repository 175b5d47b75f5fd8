//! Bearer token verification.
//!
//! [`authenticate`] is a pure function of its inputs: configuration, the raw
//! header value, and the current time. It performs no I/O and keeps no state
//! between calls, so repeating a call gives the same decision.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Validation, decode, decode_header, errors::ErrorKind};

use crate::claims::SCOPE;
use crate::{AccessClaims, AuthError, KeySet, validate_claims};

/// Algorithms a token header may declare. Anything else is rejected before
/// key material is touched.
const ALLOWED_ALGORITHMS: &[Algorithm] = &[Algorithm::RS256];

/// Verifier configuration, built once at startup and shared read-only.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticatorConfig {
    key_set_json: Vec<u8>,
    issuer: String,
}

impl AuthenticatorConfig {
    pub fn new(key_set_json: impl Into<Vec<u8>>, issuer: impl Into<String>) -> Self {
        Self {
            key_set_json: key_set_json.into(),
            issuer: issuer.into(),
        }
    }

    pub fn key_set_json(&self) -> &[u8] {
        &self.key_set_json
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl core::fmt::Debug for AuthenticatorConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthenticatorConfig")
            .field("key_set_json_len", &self.key_set_json.len())
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Identity and grants of a verified caller, attached to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAuthContext {
    client_id: String,
    scope: String,
}

impl RequestAuthContext {
    pub fn new(client_id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            scope: scope.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Granted scopes as the raw space-delimited claim value.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split(' ')
    }
}

/// Verify a compact RS256 token and extract the caller's context.
///
/// The root-path bypass is the caller's responsibility since this function
/// never sees the request path.
pub fn authenticate(
    config: &AuthenticatorConfig,
    raw_header_value: &str,
    now: DateTime<Utc>,
) -> Result<RequestAuthContext, AuthError> {
    if raw_header_value.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let keys = KeySet::from_json(config.key_set_json())?;

    let segments = raw_header_value.split('.').count();
    if segments != 3 {
        return Err(AuthError::TokenMalformed(format!(
            "expected 3 segments, found {segments}"
        )));
    }

    let header = decode_header(raw_header_value)
        .map_err(|e| AuthError::TokenMalformed(format!("header: {e}")))?;
    if !ALLOWED_ALGORITHMS.contains(&header.alg) {
        return Err(AuthError::TokenMalformed(format!(
            "algorithm {:?} is not accepted",
            header.alg
        )));
    }

    let kid = header.kid.unwrap_or_default();
    let key = keys
        .find(&kid)
        .ok_or_else(|| AuthError::UnknownSigningKey(kid.clone()))?;

    let token = decode::<AccessClaims>(raw_header_value, key, &signature_only())
        .map_err(decode_error)?;
    let claims = token.claims;

    if let Err(err) = validate_claims(&claims, config.issuer(), now) {
        tracing::debug!(claim = err.claim(), error = %err, "token claim rejected");
        return Err(err.into());
    }
    if claims.scope.is_none() {
        tracing::debug!(claim = SCOPE, "claim absent, no scopes granted");
    }

    Ok(RequestAuthContext {
        client_id: claims.client_id.unwrap_or_default(),
        scope: claims.scope.unwrap_or_default(),
    })
}

/// Validation settings that only check the signature.
///
/// Claim checks are left to [`validate_claims`] so their order and strictness
/// stay in one place.
fn signature_only() -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation
}

fn decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
            AuthError::KeySetInvalid(err.to_string())
        }
        // Claims are validated separately, so anything else is a token that
        // could not be decoded.
        _ => AuthError::TokenMalformed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::ClaimError;
    use crate::testutil::{self, ISSUER};

    fn config() -> AuthenticatorConfig {
        AuthenticatorConfig::new(testutil::key_set_json(&[testutil::primary_key()]), ISSUER)
    }

    fn sign(claims: serde_json::Value) -> String {
        testutil::sign(testutil::primary_key(), &claims)
    }

    #[test]
    fn valid_token_yields_context() {
        let token = sign(testutil::access_claims(
            "client_id_1234567890",
            "https://api.example/all",
        ));

        let ctx = authenticate(&config(), &token, Utc::now()).unwrap();
        assert_eq!(ctx.client_id(), "client_id_1234567890");
        assert_eq!(ctx.scope(), "https://api.example/all");
    }

    #[test]
    fn missing_scope_defaults_to_empty() {
        let mut claims = testutil::access_claims("c1", "ignored");
        claims.as_object_mut().unwrap().remove("scope");

        let ctx = authenticate(&config(), &sign(claims), Utc::now()).unwrap();
        assert_eq!(ctx.scope(), "");
    }

    #[test]
    fn empty_header_is_missing_token() {
        assert_eq!(authenticate(&config(), "", Utc::now()), Err(AuthError::MissingToken));
    }

    #[test]
    fn invalid_key_set_rejected() {
        let token = sign(testutil::access_claims("c1", ""));
        let config = AuthenticatorConfig::new(b"{".to_vec(), ISSUER);

        let err = authenticate(&config, &token, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "key_set_invalid");
    }

    #[test]
    fn structural_garbage_is_malformed() {
        for raw in ["abc", "a.b", "a.b.c.d", "bad.token.struct", "...", "Bearer x.y.z"] {
            let err = authenticate(&config(), raw, Utc::now()).unwrap_err();
            assert_eq!(err.kind(), "token_malformed", "input {raw:?}");
        }
    }

    #[test]
    fn hs256_token_is_rejected_before_key_lookup() {
        let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
            eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.\
            SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

        let err = authenticate(&config(), token, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "token_malformed");
    }

    #[test]
    fn alg_none_is_rejected() {
        let token = testutil::forge_token(
            &json!({"alg": "none", "kid": testutil::PRIMARY_KID}),
            &testutil::access_claims("c1", ""),
            "",
        );

        let err = authenticate(&config(), &token, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "token_malformed");
    }

    #[test]
    fn unknown_kid_rejected() {
        let token = testutil::sign(testutil::secondary_key(), &testutil::access_claims("c1", ""));

        let err = authenticate(&config(), &token, Utc::now()).unwrap_err();
        assert_eq!(err, AuthError::UnknownSigningKey(testutil::SECONDARY_KID.to_string()));
    }

    #[test]
    fn missing_kid_rejected() {
        let token = testutil::forge_token(
            &json!({"alg": "RS256", "typ": "JWT"}),
            &testutil::access_claims("c1", ""),
            "c2ln",
        );

        let err = authenticate(&config(), &token, Utc::now()).unwrap_err();
        assert_eq!(err, AuthError::UnknownSigningKey(String::new()));
    }

    #[test]
    fn signature_from_other_key_rejected() {
        // Signed by the secondary key but claiming the primary key's id.
        let token = testutil::sign_with_kid(
            testutil::secondary_key(),
            testutil::PRIMARY_KID,
            &testutil::access_claims("c1", ""),
        );

        assert_eq!(
            authenticate(&config(), &token, Utc::now()),
            Err(AuthError::SignatureInvalid)
        );
    }

    #[test]
    fn tampered_payload_rejected() {
        let token = sign(testutil::access_claims("c1", "https://api.example/a"));
        let parts: Vec<&str> = token.split('.').collect();
        let forged_payload = testutil::encode_segment(&testutil::access_claims(
            "c1",
            "https://api.example/everything",
        ));
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            authenticate(&config(), &tampered, Utc::now()),
            Err(AuthError::SignatureInvalid)
        );
    }

    #[test]
    fn claim_failures_surface_as_claim_invalid() {
        let mut wrong_sub = testutil::access_claims("c1", "");
        wrong_sub["sub"] = json!("someone-else");

        let mut expired = testutil::access_claims("c1", "");
        expired["exp"] = json!(1);

        let mut id_token = testutil::access_claims("c1", "");
        id_token["token_use"] = json!("id");

        let mut foreign_issuer = testutil::access_claims("c1", "");
        foreign_issuer["iss"] = json!("https://evil.example");

        let cases = [
            (wrong_sub, ClaimError::SubjectMismatch),
            (expired, ClaimError::Expired),
            (id_token, ClaimError::WrongTokenUse),
            (foreign_issuer, ClaimError::IssuerMismatch),
        ];

        for (claims, expected) in cases {
            assert_eq!(
                authenticate(&config(), &sign(claims), Utc::now()),
                Err(AuthError::ClaimInvalid(expected))
            );
        }
    }

    #[test]
    fn decision_is_repeatable() {
        let token = sign(testutil::access_claims("c1", "s"));
        let now = Utc::now();

        let first = authenticate(&config(), &token, now);
        let second = authenticate(&config(), &token, now);
        assert_eq!(first, second);
        assert!(first.is_ok());

        let later = now + Duration::days(1);
        assert_eq!(
            authenticate(&config(), &token, later),
            Err(AuthError::ClaimInvalid(ClaimError::Expired))
        );
    }

    #[test]
    fn scopes_split_on_single_spaces() {
        let ctx = RequestAuthContext::new("c", "https://x/a-b https://x/c-d");
        assert_eq!(ctx.scopes().collect::<Vec<_>>(), ["https://x/a-b", "https://x/c-d"]);
    }

    #[test]
    fn only_a_bad_signature_maps_to_signature_invalid() {
        let bad_signature = decode_error(ErrorKind::InvalidSignature.into());
        assert_eq!(bad_signature, AuthError::SignatureInvalid);

        for kind in [
            ErrorKind::ExpiredSignature,
            ErrorKind::ImmatureSignature,
            ErrorKind::InvalidIssuer,
            ErrorKind::MissingRequiredClaim("exp".to_string()),
        ] {
            let err = decode_error(kind.into());
            assert_eq!(err.kind(), "token_malformed", "{err}");
        }
    }
}
