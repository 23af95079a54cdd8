//! Error types for the Albert SDK configuration layer.
//!
//! Configuration constructors return `Result<T, ConfigError>` so that invalid
//! settings are rejected when the client is built rather than on the first
//! request.
//!
//! # Example
//!
//! ```rust
//! use albert::{AccessToken, ConfigError};
//!
//! let result = AccessToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyAccessToken)));
//! ```

use thiserror::Error;

/// Errors that can occur while building an [`AlbertConfig`](crate::AlbertConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Access token cannot be empty.
    #[error("Access token cannot be empty. Provide a valid Albert bearer token.")]
    EmptyAccessToken,

    /// OAuth client id cannot be empty.
    #[error("Client id cannot be empty. Provide the client id issued by Albert.")]
    EmptyClientId,

    /// OAuth client secret cannot be empty.
    #[error("Client secret cannot be empty. Provide the client secret issued by Albert.")]
    EmptyClientSecret,

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Expected an absolute http(s) URL such as 'https://app.albertinvent.com'.")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A retry or timeout setting is out of range.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidSetting {
        /// The setting that was rejected.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
