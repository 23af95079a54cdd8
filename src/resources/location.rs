//! Location resource: a site where inventory is stored or users work.

use serde::{Deserialize, Serialize};

use crate::rest::{AlbertResource, ValidationError};

use super::common::{AuditFields, EntityLink, Status};

/// A physical location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Server-assigned id (`LOC...`).
    #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Site name.
    pub name: String,

    /// Latitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

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

impl Location {
    /// Creates an unsaved location.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            latitude: None,
            longitude: None,
            address: None,
            country: None,
            status: None,
            created: None,
            updated: None,
        }
    }

    /// Sets the coordinates.
    #[must_use]
    pub const fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Returns a link to this location, if it is saved.
    #[must_use]
    pub fn to_link(&self) -> Option<EntityLink> {
        self.id
            .as_ref()
            .map(|id| EntityLink::new(id.clone()).with_name(self.name.clone()))
    }
}

impl AlbertResource for Location {
    const NAME: &'static str = "Location";
    const PATH: &'static str = "/api/v3/locations";
    const ID_PREFIX: &'static str = "LOC";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name"];
    const FILTERS: &'static [&'static str] = &["country"];
    const PATCHABLE: &'static [&'static str] =
        &["latitude", "longitude", "address", "country", "name"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut error = ValidationError::new(Self::NAME);
        error.check(!self.name.trim().is_empty(), "name", "must not be empty");
        error.check(
            self.latitude.map_or(true, |lat| (-90.0..=90.0).contains(&lat)),
            "latitude",
            "must be between -90 and 90",
        );
        error.check(
            self.longitude.map_or(true, |lon| (-180.0..=180.0).contains(&lon)),
            "longitude",
            "must be between -180 and 180",
        );
        error.into_result()
    }
}
