//! Bearer token resolution.
//!
//! [`CredentialProvider`] answers one question per request: which bearer token
//! goes into the `Authorization` header. Static tokens resolve without I/O.
//! Client credentials are exchanged at `/api/v3/login/oauth/token` and the
//! resulting JWT is cached until one minute before its `exp` claim.

use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::auth::{AuthError, ClientCredentials, Credential, CredentialConfig, CredentialSource};
use crate::config::{AccessToken, BaseUrl};

/// Path of the OAuth token endpoint.
pub const TOKEN_PATH: &str = "/api/v3/login/oauth/token";

/// Grant type sent to the token endpoint.
const CLIENT_CREDENTIALS_GRANT_TYPE: &str = "client_credentials";

/// Seconds before `exp` at which a cached token is considered stale.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Largest `exp` that is still a plausible seconds epoch (year 9999).
const MAX_SECONDS_EPOCH: f64 = 253_402_300_799.0;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<f64>,
}

#[derive(Debug)]
struct CachedToken {
    token: AccessToken,
    refresh_at: i64,
}

/// Exchanges client credentials for access tokens and caches the result.
#[derive(Debug)]
struct TokenManager {
    credentials: ClientCredentials,
    token_url: String,
    http: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    async fn token(&self) -> Result<AccessToken, AuthError> {
        // Held across the exchange so concurrent callers share one refresh.
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if Utc::now().timestamp() < cached.refresh_at {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self) -> Result<CachedToken, AuthError> {
        tracing::debug!(url = %self.token_url, "requesting client credentials token");

        let form = [
            ("grant_type", CLIENT_CREDENTIALS_GRANT_TYPE),
            ("client_id", self.credentials.id().as_ref()),
            ("client_secret", self.credentials.secret().as_ref()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::TokenRequestFailed {
                status: 0,
                message: format!("Network error: {e}"),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenRequestFailed {
                status,
                message: body,
            });
        }

        let parsed: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| AuthError::TokenRequestFailed {
                    status,
                    message: format!("Failed to parse token response: {e}"),
                })?;

        let token = AccessToken::new(parsed.access_token).map_err(|_| AuthError::InvalidToken {
            reason: "token endpoint returned an empty access_token".to_string(),
        })?;
        let expires_at = decode_expiry(token.as_ref())?;

        Ok(CachedToken {
            token,
            refresh_at: expires_at - REFRESH_MARGIN_SECS,
        })
    }
}

/// Reads the `exp` claim of a JWT without verifying its signature.
///
/// Returns the expiry as a seconds epoch; millisecond values are scaled down.
///
/// # Errors
///
/// Returns [`AuthError::InvalidToken`] if the token is not a JWT or carries no
/// `exp` claim.
#[allow(clippy::cast_possible_truncation)]
pub fn decode_expiry(token: &str) -> Result<i64, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| AuthError::InvalidToken {
            reason: format!("could not decode JWT: {e}"),
        })?;

    let exp = data.claims.exp.ok_or_else(|| AuthError::InvalidToken {
        reason: "JWT has no exp claim".to_string(),
    })?;

    let seconds = if exp > MAX_SECONDS_EPOCH { exp / 1000.0 } else { exp };
    Ok(seconds as i64)
}

/// Resolves the bearer token attached to every outgoing request.
///
/// A token installed with [`rotate`](Self::rotate) wins over everything the
/// provider was constructed with.
#[derive(Debug)]
pub struct CredentialProvider {
    current: RwLock<Option<Credential>>,
    token_manager: Option<TokenManager>,
}

impl CredentialProvider {
    /// Creates a provider from the configured credential.
    ///
    /// `http` and `base_url` are only used for the client-credentials exchange.
    #[must_use]
    pub fn new(config: Option<&CredentialConfig>, http: reqwest::Client, base_url: &BaseUrl) -> Self {
        match config {
            Some(CredentialConfig::Token(credential)) => Self {
                current: RwLock::new(Some(credential.clone())),
                token_manager: None,
            },
            Some(CredentialConfig::ClientCredentials(credentials)) => Self {
                current: RwLock::new(None),
                token_manager: Some(TokenManager {
                    credentials: credentials.clone(),
                    token_url: base_url.join(TOKEN_PATH),
                    http,
                    cache: Mutex::new(None),
                }),
            },
            None => Self {
                current: RwLock::new(None),
                token_manager: None,
            },
        }
    }

    /// Returns the bearer token for the next request.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredential`] if nothing was configured
    /// - [`AuthError::TokenRequestFailed`] / [`AuthError::InvalidToken`] if the
    ///   client-credentials exchange fails
    pub async fn resolve(&self) -> Result<AccessToken, AuthError> {
        if let Some(credential) = self.current() {
            return Ok(credential.token().clone());
        }
        match &self.token_manager {
            Some(manager) => manager.token().await,
            None => Err(AuthError::MissingCredential),
        }
    }

    /// Returns the static credential currently installed, if any.
    #[must_use]
    pub fn current(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the bearer token used by every subsequent request.
    pub fn rotate(&self, token: AccessToken) {
        tracing::debug!("rotating bearer token");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Credential::new(token, CredentialSource::Explicit));
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CredentialProvider>();
};
