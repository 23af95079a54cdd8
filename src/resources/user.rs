//! User resource.
//!
//! Users are listed through the offset-paged `/api/v3/users/search`
//! endpoint and updated by replacing the whole document.

use serde::{Deserialize, Serialize};

use crate::rest::{AlbertResource, PaginationScheme, UpdateStrategy, ValidationError};

use super::common::{AuditFields, EntityLink, Status};

/// A platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id (`USR...`).
    #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name.
    pub name: String,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Home location.
    #[serde(
        rename = "Location",
        alias = "location",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<EntityLink>,

    /// Granted roles.
    #[serde(rename = "Roles", alias = "roles", default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<EntityLink>,

    /// Account class, e.g. `standard`.
    #[serde(rename = "userClass", default, skip_serializing_if = "Option::is_none")]
    pub user_class: Option<String>,

    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Creation audit.
    #[serde(rename = "Created", default, skip_serializing_if = "Option::is_none")]
    pub created: Option<AuditFields>,

    /// Last-change audit.
    #[serde(rename = "Updated", default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<AuditFields>,
}

impl User {
    /// Creates an unsaved standard user.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: Some(email.into()),
            location: None,
            roles: Vec::new(),
            user_class: Some("standard".to_string()),
            status: None,
            created: None,
            updated: None,
        }
    }
}

impl AlbertResource for User {
    const NAME: &'static str = "User";
    const PATH: &'static str = "/api/v3/users";
    const ID_PREFIX: &'static str = "USR";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name"];
    const FILTERS: &'static [&'static str] = &["status", "searchFields"];
    const PAGINATION: PaginationScheme = PaginationScheme::Offset;
    const UPDATE_STRATEGY: UpdateStrategy = UpdateStrategy::Replace;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut error = ValidationError::new(Self::NAME);
        error.check(!self.name.trim().is_empty(), "name", "must not be empty");
        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            error.check(valid, "email", "is not an email address");
        }
        error.into_result()
    }
}
