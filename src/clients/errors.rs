//! HTTP-specific error types for the Albert SDK.
//!
//! - [`HttpResponseError`]: non-2xx responses that were not retried
//! - [`MaxHttpRetriesExceededError`]: retryable responses that kept failing
//! - [`InvalidHttpRequestError`]: requests rejected before sending
//! - [`HttpError`]: unified error type for the transport layer
//!
//! # Example
//!
//! ```rust,ignore
//! use albert::clients::HttpError;
//!
//! match client.request(request).await {
//!     Ok(response) => println!("{}", response.body),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.message),
//!     Err(HttpError::AmbiguousOutcome { method, url, .. }) => {
//!         println!("{method} {url} may or may not have been applied");
//!     }
//!     Err(e) => println!("transport error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::auth::AuthError;

/// Error returned when a request receives a non-successful response.
///
/// `message` is extracted from the usual Albert error fields (`message`,
/// `title`, `detail`, `errors`) and falls back to the raw body text.
///
/// # Example
///
/// ```rust
/// use albert::clients::HttpResponseError;
/// use serde_json::json;
///
/// let error = HttpResponseError::new(404, json!({"title": "Inventory not found"}));
/// assert_eq!(error.message, "Inventory not found");
/// assert_eq!(error.to_string(), "HTTP 404: Inventory not found");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
#[error("HTTP {code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Human readable error message.
    pub message: String,
    /// The parsed response body.
    pub body: serde_json::Value,
}

impl HttpResponseError {
    /// Builds an error from a status code and parsed body.
    #[must_use]
    pub fn new(code: u16, body: serde_json::Value) -> Self {
        let message = extract_message(&body);
        Self {
            code,
            message,
            body,
        }
    }
}

/// Error returned when retryable failures persisted through every attempt.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Exceeded maximum retry count of {tries}. Last response: HTTP {code}: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// Status code of the last response.
    pub code: u16,
    /// Number of attempts made.
    pub tries: u32,
    /// Message extracted from the last response.
    pub message: String,
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST, PUT or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The request path was empty.
    #[error("Request path cannot be empty.")]
    EmptyPath,
}

/// Unified error type for the transport layer.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Retry attempts exhausted on retryable responses.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// No bearer token could be resolved.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A non-idempotent request failed after it may have reached the server.
    #[error("Outcome of {method} {url} is unknown: {reason}")]
    AmbiguousOutcome {
        /// HTTP method of the request.
        method: String,
        /// Absolute URL of the request.
        url: String,
        /// Underlying failure.
        reason: String,
    },

    /// A response body was not valid JSON.
    #[error("Response with status {code} is not valid JSON: {body}")]
    InvalidJson {
        /// HTTP status code.
        code: u16,
        /// Raw response body.
        body: String,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the HTTP status code associated with this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::MaxRetries(e) => Some(e.code),
            Self::InvalidJson { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn extract_message(body: &serde_json::Value) -> String {
    for key in ["message", "title", "detail", "error"] {
        if let Some(text) = body.get(key).and_then(serde_json::Value::as_str) {
            return text.to_string();
        }
    }
    if let Some(errors) = body.get("errors") {
        return errors.to_string();
    }
    match body {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
