//! JSON Web Key Set parsing.
//!
//! The key set document is fetched once at startup by the caller and handed
//! over as raw bytes; parsing it never touches the network.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;

use crate::AuthError;

const RSA_KEY_TYPE: &str = "RSA";
const SIGNATURE_USE: &str = "sig";
const RS256: &str = "RS256";

#[derive(Debug, Deserialize)]
struct JwkDocument {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    alg: Option<String>,
    #[serde(default, rename = "use")]
    key_use: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

/// RSA verification keys indexed by key id, in document order.
#[derive(Clone)]
pub struct KeySet {
    keys: Vec<(String, DecodingKey)>,
}

impl KeySet {
    /// Parse a JWKS document.
    ///
    /// Fails on malformed JSON, non-RSA keys, and RSA keys whose modulus or
    /// exponent is missing or not base64url. Keys marked for a use other than
    /// signing, or for an algorithm other than RS256, are skipped.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AuthError> {
        let document: JwkDocument = serde_json::from_slice(bytes)
            .map_err(|e| AuthError::KeySetInvalid(format!("malformed JWKS document: {e}")))?;

        let mut keys = Vec::with_capacity(document.keys.len());
        for (index, jwk) in document.keys.into_iter().enumerate() {
            if jwk.kty != RSA_KEY_TYPE {
                return Err(AuthError::KeySetInvalid(format!(
                    "key {index}: unsupported key type '{}'",
                    jwk.kty
                )));
            }

            let kid = match jwk.kid {
                Some(kid) if !kid.is_empty() => kid,
                _ => return Err(AuthError::KeySetInvalid(format!("key {index}: missing kid"))),
            };

            if jwk.key_use.as_deref().is_some_and(|u| u != SIGNATURE_USE)
                || jwk.alg.as_deref().is_some_and(|a| a != RS256)
            {
                tracing::debug!(kid = %kid, "skipping JWKS entry not usable for RS256 signatures");
                continue;
            }

            let n = component(&kid, "n", jwk.n.as_deref())?;
            let e = component(&kid, "e", jwk.e.as_deref())?;
            let key = DecodingKey::from_rsa_components(n, e)
                .map_err(|err| AuthError::KeySetInvalid(format!("key '{kid}': {err}")))?;

            keys.push((kid, key));
        }

        Ok(Self { keys })
    }

    /// First key whose id equals `kid` exactly.
    pub fn find(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.iter().find(|(id, _)| id == kid).map(|(_, key)| key)
    }

    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|(kid, _)| kid.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl core::fmt::Debug for KeySet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeySet")
            .field("kids", &self.kids().collect::<Vec<_>>())
            .finish()
    }
}

/// Checks that an RSA component is present and decodes to at least one byte.
fn component<'a>(kid: &str, name: &str, value: Option<&'a str>) -> Result<&'a str, AuthError> {
    let value = value
        .ok_or_else(|| AuthError::KeySetInvalid(format!("key '{kid}': missing '{name}'")))?;

    match URL_SAFE_NO_PAD.decode(value) {
        Ok(bytes) if !bytes.is_empty() => Ok(value),
        Ok(_) => Err(AuthError::KeySetInvalid(format!("key '{kid}': empty '{name}'"))),
        Err(err) => Err(AuthError::KeySetInvalid(format!(
            "key '{kid}': '{name}' is not base64url: {err}"
        ))),
    }
}
