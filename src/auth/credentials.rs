//! Credential value types.

use crate::config::{AccessToken, ClientId, ClientSecret};

/// Where a credential came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialSource {
    /// Supplied directly through the config builder or `Albert::rotate_token`.
    Explicit,
    /// Read by `AlbertConfig::from_env`.
    Environment,
}

/// A resolved bearer token together with its source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    token: AccessToken,
    source: CredentialSource,
}

impl Credential {
    /// Creates a new credential.
    #[must_use]
    pub const fn new(token: AccessToken, source: CredentialSource) -> Self {
        Self { token, source }
    }

    /// Returns the bearer token.
    #[must_use]
    pub const fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Returns where the token came from.
    #[must_use]
    pub const fn source(&self) -> CredentialSource {
        self.source
    }
}

/// OAuth client credentials exchanged for short-lived access tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCredentials {
    id: ClientId,
    secret: ClientSecret,
    source: CredentialSource,
}

impl ClientCredentials {
    /// Creates a new client credential pair.
    #[must_use]
    pub const fn new(id: ClientId, secret: ClientSecret, source: CredentialSource) -> Self {
        Self { id, secret, source }
    }

    /// Returns the client id.
    #[must_use]
    pub const fn id(&self) -> &ClientId {
        &self.id
    }

    /// Returns the client secret.
    #[must_use]
    pub const fn secret(&self) -> &ClientSecret {
        &self.secret
    }

    /// Returns where the pair came from.
    #[must_use]
    pub const fn source(&self) -> CredentialSource {
        self.source
    }
}

/// The credential a client was configured with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialConfig {
    /// A static bearer token.
    Token(Credential),
    /// OAuth client credentials.
    ClientCredentials(ClientCredentials),
}

impl CredentialConfig {
    /// Returns where the configured credential came from.
    #[must_use]
    pub const fn source(&self) -> CredentialSource {
        match self {
            Self::Token(credential) => credential.source(),
            Self::ClientCredentials(credentials) => credentials.source(),
        }
    }
}
