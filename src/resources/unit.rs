//! Unit-of-measure resource.

use serde::{Deserialize, Serialize};

use crate::rest::{AlbertResource, ValidationError};

use super::common::{AuditFields, Status};

/// Physical dimension a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    #[serde(rename = "Length")]
    Length,
    #[serde(rename = "Volume")]
    Volume,
    #[serde(rename = "Liquid volume")]
    LiquidVolume,
    #[serde(rename = "Angles")]
    Angles,
    #[serde(rename = "Time")]
    Time,
    #[serde(rename = "Frequency")]
    Frequency,
    #[serde(rename = "Mass")]
    Mass,
    #[serde(rename = "Electric current")]
    Current,
    #[serde(rename = "Temperature")]
    Temperature,
    #[serde(rename = "Amount of substance")]
    Amount,
    #[serde(rename = "Luminous intensity")]
    Luminosity,
    #[serde(rename = "Force")]
    Force,
    #[serde(rename = "Energy")]
    Energy,
    #[serde(rename = "Power")]
    Power,
    #[serde(rename = "Pressure")]
    Pressure,
    #[serde(rename = "Electricity and magnetism")]
    ElectricityAndMagnetism,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Weight")]
    Weight,
    #[serde(rename = "Area")]
    Area,
    #[serde(rename = "Surface Area")]
    SurfaceArea,
    #[serde(rename = "Binary")]
    Binary,
    #[serde(rename = "Capacitance")]
    Capacitance,
    #[serde(rename = "Speed")]
    Speed,
    #[serde(rename = "Electrical conductivity")]
    ElectricalConductivity,
    #[serde(rename = "Electrical permitivitty")]
    ElectricalPermittivity,
    #[serde(rename = "Density")]
    Density,
    #[serde(rename = "Resistance")]
    Resistance,
}

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Server-assigned id (`UNI...`).
    #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Unit name, e.g. `Kilogram`.
    pub name: String,

    /// Symbol, e.g. `kg`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// Alternative spellings.
    #[serde(rename = "Synonyms", default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,

    /// Dimension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<UnitCategory>,

    /// Whether Albert curates this unit. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,

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

impl Unit {
    /// Creates an unsaved unit.
    #[must_use]
    pub fn new(name: impl Into<String>, category: UnitCategory) -> Self {
        Self {
            id: None,
            name: name.into(),
            symbol: None,
            synonyms: Vec::new(),
            category: Some(category),
            verified: None,
            status: None,
            created: None,
            updated: None,
        }
    }

    /// Sets the symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

impl AlbertResource for Unit {
    const NAME: &'static str = "Unit";
    const PATH: &'static str = "/api/v3/units";
    const ID_PREFIX: &'static str = "UNI";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name"];
    const READ_ONLY_FIELDS: &'static [&'static str] = &["Created", "Updated", "verified"];
    const FILTERS: &'static [&'static str] = &["category", "verified"];
    const PATCHABLE: &'static [&'static str] = &["symbol", "Synonyms", "category"];

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
            self.synonyms.iter().all(|s| !s.trim().is_empty()),
            "Synonyms",
            "must not contain empty entries",
        );
        error.into_result()
    }
}
