//! Types shared by several resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status carried by most resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// In use.
    Active,
    /// Archived.
    Inactive,
}

/// Visibility class of inventory items and projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityClass {
    /// Visible to the whole tenant.
    Shared,
    /// Visible to listed teams.
    Restricted,
    /// Visible to listed users.
    Confidential,
    /// Visible to the owner.
    Private,
    /// Visible to everyone.
    #[default]
    Public,
}

/// Who changed a resource and when. Set by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    /// User id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,

    /// User display name.
    #[serde(rename = "byName", default, skip_serializing_if = "Option::is_none")]
    pub by_name: Option<String>,

    /// Timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
}

/// A reference to another resource by id.
///
/// ```rust
/// use albert::resources::EntityLink;
///
/// let link = EntityLink::new("COM12").with_name("Acme");
/// assert_eq!(
///     serde_json::to_value(&link).unwrap(),
///     serde_json::json!({"id": "COM12", "name": "Acme"})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityLink {
    /// Id of the linked resource.
    pub id: String,

    /// Display name, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityLink {
    /// Creates a link without a name.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Adds a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
