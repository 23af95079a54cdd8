//! Tag resource.
//!
//! Tags label inventory items, projects and companies. They are listed by
//! key and can be renamed with a `name` patch.

use serde::{Deserialize, Serialize};

use crate::rest::{AlbertResource, DeletePolicy, ValidationError};

use super::common::{AuditFields, EntityLink, Status};

/// A tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Server-assigned id (`TAG...`).
    #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Tag text.
    pub name: String,

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

impl Tag {
    /// Creates an unsaved tag.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            status: None,
            created: None,
            updated: None,
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns a link to this tag, if it is saved.
    #[must_use]
    pub fn to_link(&self) -> Option<EntityLink> {
        self.id
            .as_ref()
            .map(|id| EntityLink::new(id.clone()).with_name(self.name.clone()))
    }
}

impl AlbertResource for Tag {
    const NAME: &'static str = "Tag";
    const PATH: &'static str = "/api/v3/tags";
    const ID_PREFIX: &'static str = "TAG";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name"];
    const PATCHABLE: &'static [&'static str] = &["name"];
    const DELETE_POLICY: DeletePolicy = DeletePolicy::IdempotentNotFound;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut error = ValidationError::new(Self::NAME);
        error.check(!self.name.trim().is_empty(), "name", "must not be empty");
        error.into_result()
    }
}
