//! Project resource.

use serde::{Deserialize, Serialize};

use crate::rest::{AlbertResource, ValidationError};

use super::common::{AuditFields, EntityLink, SecurityClass, Status};

/// Project category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectCategory {
    /// Product development.
    Development,
    /// Exploratory research.
    Research,
    /// Production support.
    Production,
}

/// A project. Formulas belong to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Server-assigned id (`PRO...`).
    #[serde(rename = "projectId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Short name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description shown as the project title.
    pub description: String,

    /// Category.
    pub category: ProjectCategory,

    /// Visibility.
    #[serde(rename = "class", default)]
    pub security_class: SecurityClass,

    /// Owning company.
    #[serde(rename = "Company", default, skip_serializing_if = "Option::is_none")]
    pub company: Option<EntityLink>,

    /// Tags.
    #[serde(rename = "Tags", default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntityLink>,

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

impl Project {
    /// Creates an unsaved public project.
    #[must_use]
    pub fn new(description: impl Into<String>, category: ProjectCategory) -> Self {
        Self {
            id: None,
            name: None,
            description: description.into(),
            category,
            security_class: SecurityClass::Public,
            company: None,
            tags: Vec::new(),
            status: None,
            created: None,
            updated: None,
        }
    }
}

impl AlbertResource for Project {
    const NAME: &'static str = "Project";
    const PATH: &'static str = "/api/v3/projects";
    const ID_FIELD: &'static str = "projectId";
    const ID_PREFIX: &'static str = "PRO";
    const REQUIRED_FIELDS: &'static [&'static str] = &["description", "category"];
    const FILTERS: &'static [&'static str] = &["category"];
    const PATCHABLE: &'static [&'static str] = &["name", "description", "status"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref().or(Some(&self.description))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut error = ValidationError::new(Self::NAME);
        error.check(
            !self.description.trim().is_empty(),
            "description",
            "must not be empty",
        );
        error.into_result()
    }
}
