//! Shared test utilities for token verification.
//!
//! Provides RSA key pairs, JWKS documents built from them, signed access
//! tokens, and raw token assembly for attack testing. Gated behind the
//! `testutil` feature so none of it ships in production builds:
//!
//! ```toml
//! [dev-dependencies]
//! apigate-auth = { path = "../auth", features = ["testutil"] }
//! ```

use std::sync::LazyLock;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::{RsaPrivateKey, pkcs1::EncodeRsaPrivateKey, traits::PublicKeyParts};
use serde_json::{Value, json};

/// Issuer used by [`access_claims`].
pub const ISSUER: &str = "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_xxxxxxxxxx";

pub const PRIMARY_KID: &str = "mykey";
pub const SECONDARY_KID: &str = "otherkey";

/// An RSA signing key with its public JWK components.
pub struct TestKey {
    kid: &'static str,
    encoding_key: EncodingKey,
    n: String,
    e: String,
}

impl TestKey {
    /// Generates a fresh 2048-bit key.
    ///
    /// # Panics
    ///
    /// Panics if key generation or PKCS#1 encoding fails.
    pub fn generate(kid: &'static str) -> Self {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048)
            .expect("failed to generate RSA key");
        let der = private
            .to_pkcs1_der()
            .expect("failed to encode RSA key as PKCS#1");
        let public = private.to_public_key();

        Self {
            kid,
            encoding_key: EncodingKey::from_rsa_der(der.as_bytes()),
            n: URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
        }
    }

    pub fn kid(&self) -> &'static str {
        self.kid
    }

    /// Public half of the key as a JWK object.
    pub fn jwk(&self) -> Value {
        json!({
            "kty": "RSA",
            "kid": self.kid,
            "alg": "RS256",
            "use": "sig",
            "n": self.n,
            "e": self.e,
        })
    }
}

// Key generation is slow in debug builds, so each key is made once per binary.
static PRIMARY: LazyLock<TestKey> = LazyLock::new(|| TestKey::generate(PRIMARY_KID));
static SECONDARY: LazyLock<TestKey> = LazyLock::new(|| TestKey::generate(SECONDARY_KID));

/// The key normally placed in the configured key set.
pub fn primary_key() -> &'static TestKey {
    &PRIMARY
}

/// A key normally absent from the configured key set.
pub fn secondary_key() -> &'static TestKey {
    &SECONDARY
}

/// Serializes a JWKS document containing the public halves of `keys`.
pub fn key_set_json(keys: &[&TestKey]) -> Vec<u8> {
    let keys: Vec<Value> = keys.iter().map(|k| k.jwk()).collect();
    serde_json::to_vec_pretty(&json!({ "keys": keys })).expect("JWKS serializes")
}

/// Claims of a well-formed access token for `client_id`, valid for a while.
pub fn access_claims(client_id: &str, scope: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "sub": client_id,
        "token_use": "access",
        "scope": scope,
        "auth_time": now - 60,
        "iss": ISSUER,
        "exp": now + 1000,
        "iat": now - 60,
        "version": 2,
        "jti": "a6dd28cc-500e-4b49-a510-efda5195d2f4",
        "client_id": client_id,
    })
}

/// Signs `claims` with RS256 under the key's own id.
pub fn sign(key: &TestKey, claims: &Value) -> String {
    sign_with_kid(key, key.kid, claims)
}

/// Signs `claims` with RS256 while advertising an arbitrary key id.
///
/// # Panics
///
/// Panics if encoding fails.
pub fn sign_with_kid(key: &TestKey, kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    jsonwebtoken::encode(&header, claims, &key.encoding_key).expect("failed to sign token")
}

/// Base64url (unpadded) JSON segment, as used in compact tokens.
pub fn encode_segment(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

/// Assembles a compact token from raw parts without signing it.
pub fn forge_token(header: &Value, claims: &Value, signature: &str) -> String {
    format!("{}.{}.{}", encode_segment(header), encode_segment(claims), signature)
}
