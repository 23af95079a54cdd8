//! Resource-level error types.
//!
//! [`ResourceError`] is the public error taxonomy of every collection call.
//! Transport failures are mapped onto it by [`ResourceError::from_http_error`]:
//!
//! - **404**: [`ResourceError::NotFound`]
//! - **409 / 412**: [`ResourceError::Conflict`]
//! - credential failures: [`ResourceError::AuthConfiguration`]
//! - failures after a non-idempotent request was sent: [`ResourceError::AmbiguousOutcome`]
//! - everything else: [`ResourceError::Transport`]
//!
//! # Example
//!
//! ```rust,ignore
//! use albert::ResourceError;
//!
//! match albert.tags().get_by_id("TAG42").await {
//!     Ok(tag) => println!("{}", tag.name),
//!     Err(ResourceError::NotFound { resource, id }) => println!("no {resource} {id}"),
//!     Err(e) => println!("{e}"),
//! }
//! ```

use std::fmt;

use thiserror::Error;

use crate::auth::AuthError;
use crate::clients::HttpError;

/// A single offending field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the field, or `<root>` when no field could be singled out.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Structural or semantic validation failure for one resource.
///
/// ```rust
/// use albert::{FieldError, ValidationError};
///
/// let mut error = ValidationError::new("Inventory");
/// error.push(FieldError::new("name", "must not be empty"));
/// error.push(FieldError::new("category", "unknown variant `Gas`"));
///
/// assert_eq!(error.fields(), vec!["name", "category"]);
/// assert!(error.to_string().starts_with("Inventory failed validation"));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{resource} failed validation: {}", join_fields(.errors))]
pub struct ValidationError {
    /// Resource type name.
    pub resource: &'static str,
    /// Every offending field.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates an empty error for `resource`.
    #[must_use]
    pub const fn new(resource: &'static str) -> Self {
        Self {
            resource,
            errors: Vec::new(),
        }
    }

    /// Creates an error with a single offending field.
    #[must_use]
    pub fn single(
        resource: &'static str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            resource,
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Records another offending field.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Records a failure for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.push(FieldError::new(field, message));
        }
    }

    /// Returns the names of every offending field.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// Returns `true` if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into `Ok(())` when empty, `Err(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error type for collection operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No usable credential could be resolved.
    #[error("Authentication is not configured: {0}")]
    AuthConfiguration(#[source] AuthError),

    /// Local or wire validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A list query used an unsupported filter or option.
    #[error("Invalid query for {resource}: '{key}' {reason}")]
    InvalidQuery {
        /// Resource type name.
        resource: &'static str,
        /// The offending query key.
        key: String,
        /// Why the key was rejected.
        reason: String,
    },

    /// The server reports the resource as absent.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Resource type name.
        resource: &'static str,
        /// The requested id.
        id: String,
    },

    /// The write conflicts with the current server state.
    #[error("Conflict on {resource}{}: {message}", .id.as_ref().map(|id| format!(" {id}")).unwrap_or_default())]
    Conflict {
        /// Resource type name.
        resource: &'static str,
        /// Resource id, when known.
        id: Option<String>,
        /// HTTP status, when the conflict was reported by the server.
        status: Option<u16>,
        /// Server or local explanation.
        message: String,
    },

    /// A non-idempotent request failed after it may have been applied.
    #[error("Outcome of {method} {url} for {resource} is unknown: {reason}")]
    AmbiguousOutcome {
        /// Resource type name.
        resource: &'static str,
        /// HTTP method.
        method: String,
        /// Absolute URL.
        url: String,
        /// Underlying failure.
        reason: String,
    },

    /// The id was deleted through this collection earlier.
    #[error("{resource} {id} was deleted by this client")]
    StaleResource {
        /// Resource type name.
        resource: &'static str,
        /// The deleted id.
        id: String,
    },

    /// Any other transport failure.
    #[error(transparent)]
    Transport(HttpError),
}

impl ResourceError {
    /// Maps a transport error onto the resource taxonomy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use albert::clients::{HttpError, HttpResponseError};
    /// use albert::ResourceError;
    /// use serde_json::json;
    ///
    /// let http: HttpError = HttpResponseError::new(404, json!({"title": "missing"})).into();
    /// let error = ResourceError::from_http_error(http, "Tag", Some("TAG1"));
    /// assert!(matches!(error, ResourceError::NotFound { resource: "Tag", .. }));
    /// ```
    #[must_use]
    pub fn from_http_error(error: HttpError, resource: &'static str, id: Option<&str>) -> Self {
        match error {
            HttpError::Response(response) if response.code == 404 => Self::NotFound {
                resource,
                id: id.unwrap_or("unknown").to_string(),
            },
            HttpError::Response(response) if matches!(response.code, 409 | 412) => {
                Self::Conflict {
                    resource,
                    id: id.map(ToString::to_string),
                    status: Some(response.code),
                    message: response.message,
                }
            }
            HttpError::Auth(auth) => Self::AuthConfiguration(auth),
            HttpError::AmbiguousOutcome {
                method,
                url,
                reason,
            } => Self::AmbiguousOutcome {
                resource,
                method,
                url,
                reason,
            },
            other => Self::Transport(other),
        }
    }

    /// Returns the HTTP status code behind this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Conflict { status, .. } => *status,
            Self::Transport(http) => http.status(),
            _ => None,
        }
    }
}
