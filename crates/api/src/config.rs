//! Startup configuration.
//!
//! Everything here runs once before the server starts; a failure aborts
//! startup instead of serving requests that could never authenticate.

use std::time::Duration;

use thiserror::Error;

use apigate_auth::{AuthenticatorConfig, KeySet};

/// URL of the JSON Web Key Set, e.g.
/// `https://cognito-idp.$AWS_REGION.amazonaws.com/$POOL_ID/.well-known/jwks.json`.
pub const AUTH_JWKS_LOCATION: &str = "AUTH_JWKS_LOCATION";

/// Expected token issuer, e.g. `https://cognito-idp.$AWS_REGION.amazonaws.com/$POOL_ID`.
pub const AUTH_TOKEN_ISS: &str = "AUTH_TOKEN_ISS";

pub const BIND_ADDR: &str = "BIND_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("cannot fetch key set from {url}: {source}")]
    KeySetFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("key set from {url} is unusable: {source}")]
    KeySetUnusable {
        url: String,
        #[source]
        source: apigate_auth::AuthError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub jwks_location: String,
    pub issuer: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingEnv(key));

        Ok(Self {
            jwks_location: required(AUTH_JWKS_LOCATION)?,
            issuer: required(AUTH_TOKEN_ISS)?,
            bind_addr: lookup(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    /// Fetches the key set and assembles the verifier configuration.
    pub async fn authenticator_config(&self) -> Result<AuthenticatorConfig, ConfigError> {
        let key_set_json = fetch_key_set(&self.jwks_location).await?;

        // Surface an unusable document now rather than as a 401 on every request.
        let keys = KeySet::from_json(&key_set_json).map_err(|source| {
            ConfigError::KeySetUnusable {
                url: self.jwks_location.clone(),
                source,
            }
        })?;

        tracing::debug!(
            auth_token_iss = %self.issuer,
            auth_jwks_location = %self.jwks_location,
            keys = keys.len(),
            "authenticator config loaded"
        );

        Ok(AuthenticatorConfig::new(key_set_json, self.issuer.clone()))
    }
}

/// Downloads the JWKS document once. Redirects are not followed.
pub async fn fetch_key_set(url: &str) -> Result<Vec<u8>, ConfigError> {
    let fetch_error = |source| ConfigError::KeySetFetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(fetch_error)?;

    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(fetch_error)?;

    let body = response.bytes().await.map_err(fetch_error)?;
    Ok(body.to_vec())
}
