//! Configuration types for the Albert SDK.
//!
//! - [`AlbertConfig`]: immutable settings used to build an [`Albert`](crate::Albert) client
//! - [`AlbertConfigBuilder`]: fluent builder with fail-fast validation
//! - [`BaseUrl`], [`AccessToken`], [`ClientId`], [`ClientSecret`]: validated newtypes
//!
//! Environment variables are read exactly once, by [`AlbertConfig::from_env`].
//! Nothing inside the request path consults the process environment.
//!
//! # Example
//!
//! ```rust
//! use albert::{AccessToken, AlbertConfig, BaseUrl};
//! use std::time::Duration;
//!
//! let config = AlbertConfig::builder()
//!     .base_url(BaseUrl::new("https://dev.albertinventdev.com").unwrap())
//!     .token(AccessToken::new("my-token").unwrap())
//!     .timeout(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://dev.albertinventdev.com");
//! ```

mod newtypes;

pub use newtypes::{AccessToken, BaseUrl, ClientId, ClientSecret};

use std::time::Duration;

use crate::auth::{ClientCredentials, Credential, CredentialConfig, CredentialSource};
use crate::clients::RetryPolicy;
use crate::error::ConfigError;

/// Environment variable holding the base URL.
pub const ENV_BASE_URL: &str = "ALBERT_BASE_URL";
/// Environment variable holding a static bearer token.
pub const ENV_TOKEN: &str = "ALBERT_TOKEN";
/// Environment variable holding the OAuth client id.
pub const ENV_CLIENT_ID: &str = "ALBERT_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "ALBERT_CLIENT_SECRET";

/// Default total request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for an Albert client.
///
/// `AlbertConfig` is `Clone + Send + Sync` and holds no live resources; the
/// connection pool is created when the config is turned into a client.
#[derive(Clone, Debug)]
pub struct AlbertConfig {
    base_url: BaseUrl,
    credentials: Option<CredentialConfig>,
    timeout: Duration,
    connect_timeout: Duration,
    retry_policy: RetryPolicy,
    user_agent_prefix: Option<String>,
}

impl AlbertConfig {
    /// Creates a new builder with no environment defaults.
    #[must_use]
    pub fn builder() -> AlbertConfigBuilder {
        AlbertConfigBuilder::default()
    }

    /// Creates a builder pre-populated from the process environment.
    ///
    /// Reads `ALBERT_BASE_URL`, `ALBERT_TOKEN`, `ALBERT_CLIENT_ID` and
    /// `ALBERT_CLIENT_SECRET`. Values set afterwards on the builder take
    /// precedence over anything read here.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is present but invalid, e.g. a
    /// malformed `ALBERT_BASE_URL`.
    pub fn from_env() -> Result<AlbertConfigBuilder, ConfigError> {
        AlbertConfigBuilder::default().with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the resolved credential configuration, if any was supplied.
    #[must_use]
    pub const fn credentials(&self) -> Option<&CredentialConfig> {
        self.credentials.as_ref()
    }

    /// Returns the total per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the retry policy applied by the transport.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AlbertConfig>();
};

/// Builder for [`AlbertConfig`].
///
/// # Credential precedence
///
/// 1. an explicit [`token`](Self::token)
/// 2. explicit [`client_credentials`](Self::client_credentials)
/// 3. `ALBERT_TOKEN` from [`AlbertConfig::from_env`]
/// 4. `ALBERT_CLIENT_ID` / `ALBERT_CLIENT_SECRET` from the environment
///
/// Building without any credential is allowed; the first request then fails
/// with an auth configuration error.
#[derive(Debug, Default)]
pub struct AlbertConfigBuilder {
    base_url: Option<BaseUrl>,
    env_base_url: Option<BaseUrl>,
    token: Option<AccessToken>,
    env_token: Option<AccessToken>,
    client_credentials: Option<(ClientId, ClientSecret)>,
    env_client_credentials: Option<(ClientId, ClientSecret)>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
    user_agent_prefix: Option<String>,
}

impl AlbertConfigBuilder {
    /// Fills environment-sourced defaults from `lookup`.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a present value fails validation.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = read(ENV_BASE_URL) {
            self.env_base_url = Some(BaseUrl::new(url)?);
        }
        if let Some(token) = read(ENV_TOKEN) {
            self.env_token = Some(AccessToken::new(token)?);
        }
        if let (Some(id), Some(secret)) = (read(ENV_CLIENT_ID), read(ENV_CLIENT_SECRET)) {
            self.env_client_credentials = Some((ClientId::new(id)?, ClientSecret::new(secret)?));
        }

        Ok(self)
    }

    /// Sets the base URL (default: `https://app.albertinvent.com`).
    #[must_use]
    pub fn base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets an explicit bearer token.
    #[must_use]
    pub fn token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets explicit OAuth client credentials.
    #[must_use]
    pub fn client_credentials(mut self, id: ClientId, secret: ClientSecret) -> Self {
        self.client_credentials = Some((id, secret));
        self
    }

    /// Sets the total per-request timeout (default: 30s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout (default: 10s).
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the retry policy (default: [`RetryPolicy::default`]).
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets a prefix prepended to the `User-Agent` header.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`AlbertConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] if a timeout is zero or the
    /// retry policy is inconsistent.
    pub fn build(self) -> Result<AlbertConfig, ConfigError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidSetting {
                field: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        let connect_timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        if connect_timeout.is_zero() {
            return Err(ConfigError::InvalidSetting {
                field: "connect_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        let retry_policy = self.retry_policy.unwrap_or_default();
        retry_policy.validate()?;

        let credentials = resolve_credentials(
            self.token,
            self.client_credentials,
            self.env_token,
            self.env_client_credentials,
        );

        Ok(AlbertConfig {
            base_url: self
                .base_url
                .or(self.env_base_url)
                .unwrap_or_default(),
            credentials,
            timeout,
            connect_timeout,
            retry_policy,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

fn resolve_credentials(
    token: Option<AccessToken>,
    client_credentials: Option<(ClientId, ClientSecret)>,
    env_token: Option<AccessToken>,
    env_client_credentials: Option<(ClientId, ClientSecret)>,
) -> Option<CredentialConfig> {
    if let Some(token) = token {
        return Some(CredentialConfig::Token(Credential::new(
            token,
            CredentialSource::Explicit,
        )));
    }
    if let Some((id, secret)) = client_credentials {
        return Some(CredentialConfig::ClientCredentials(ClientCredentials::new(
            id,
            secret,
            CredentialSource::Explicit,
        )));
    }
    if let Some(token) = env_token {
        return Some(CredentialConfig::Token(Credential::new(
            token,
            CredentialSource::Environment,
        )));
    }
    env_client_credentials.map(|(id, secret)| {
        CredentialConfig::ClientCredentials(ClientCredentials::new(
            id,
            secret,
            CredentialSource::Environment,
        ))
    })
}
