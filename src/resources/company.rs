//! Company resource.
//!
//! Companies are suppliers or manufacturers referenced by inventory items.
//! The list endpoint supports duplicate detection (`dupDetection=true`),
//! which adds a similarity `distance` to each match.

use serde::{Deserialize, Serialize};

use crate::rest::{AlbertResource, ValidationError};

use super::common::{AuditFields, EntityLink, Status};

/// A company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Server-assigned id (`COM...`).
    #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Company name.
    pub name: String,

    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Name similarity, set by duplicate-detection searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    /// Creation audit.
    #[serde(rename = "Created", default, skip_serializing_if = "Option::is_none")]
    pub created: Option<AuditFields>,

    /// Last-change audit.
    #[serde(rename = "Updated", default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<AuditFields>,
}

impl Company {
    /// Creates an unsaved company.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            status: None,
            distance: None,
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

    /// Returns a link to this company, if it is saved.
    #[must_use]
    pub fn to_link(&self) -> Option<EntityLink> {
        self.id
            .as_ref()
            .map(|id| EntityLink::new(id.clone()).with_name(self.name.clone()))
    }
}

impl AlbertResource for Company {
    const NAME: &'static str = "Company";
    const PATH: &'static str = "/api/v3/companies";
    const ID_PREFIX: &'static str = "COM";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name"];
    const READ_ONLY_FIELDS: &'static [&'static str] = &["Created", "Updated", "distance"];
    const FILTERS: &'static [&'static str] = &["dupDetection"];
    const PATCHABLE: &'static [&'static str] = &["name"];

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
