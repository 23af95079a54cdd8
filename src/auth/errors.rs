//! Credential resolution errors.

use thiserror::Error;

/// Errors raised while resolving the bearer token for a request.
///
/// Every variant maps to an auth configuration error in the public
/// [`ResourceError`](crate::ResourceError) taxonomy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No token and no client credentials were configured.
    #[error("No Albert credential configured. Set a token or client credentials, or export ALBERT_TOKEN.")]
    MissingCredential,

    /// The OAuth token endpoint rejected the client credentials.
    #[error("Token request failed with status {status}: {message}")]
    TokenRequestFailed {
        /// HTTP status returned by the token endpoint (0 for network failures).
        status: u16,
        /// Response body or network error text.
        message: String,
    },

    /// The token endpoint answered with something that is not a usable token.
    #[error("Invalid access token: {reason}")]
    InvalidToken {
        /// What was wrong with the token.
        reason: String,
    },
}
