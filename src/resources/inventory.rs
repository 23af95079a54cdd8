//! Inventory item resource.
//!
//! Inventory items are raw materials, consumables, equipment and formulas.
//! They are searched through the offset-paged `/api/v3/inventories/search`
//! endpoint and updated with one PATCH request per changed attribute.
//! Linked entities get dedicated operations:
//!
//! - `Company` changes become `companyId` operations
//! - `Tags` changes become one `tagId` add or delete per tag
//! - `Cas` changes become `casId` adds and deletes, and `min`/`max` updates
//!   addressed to the CAS entry by `entityId`
//!
//! # Example
//!
//! ```rust
//! use albert::resources::{CasAmount, Inventory, InventoryCategory, InventoryUnitCategory};
//! use albert::rest::AlbertResource;
//!
//! let item = Inventory::new("Titanium dioxide", InventoryCategory::RawMaterials)
//!     .with_cas(CasAmount::new("CAS13463-67-7").with_range(95.0, 100.0));
//!
//! assert_eq!(item.unit_category, Some(InventoryUnitCategory::Mass));
//! assert!(item.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rest::{
    diff_attributes, diff_entity_link, diff_entity_links, AlbertResource, PaginationScheme,
    PatchDatum, PatchOperation, ValidationError,
};

use super::common::{AuditFields, EntityLink, SecurityClass, Status};

/// Exclusive upper bound of an inventory minimum.
pub const MAX_MINIMUM: f64 = 1e15;

/// Kind of inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryCategory {
    RawMaterials,
    Consumables,
    Equipment,
    Formulas,
}

impl InventoryCategory {
    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RawMaterials => "RawMaterials",
            Self::Consumables => "Consumables",
            Self::Equipment => "Equipment",
            Self::Formulas => "Formulas",
        }
    }

    /// Unit category an item of this kind gets when none is given.
    #[must_use]
    pub const fn default_unit_category(&self) -> InventoryUnitCategory {
        match self {
            Self::RawMaterials | Self::Formulas => InventoryUnitCategory::Mass,
            Self::Consumables | Self::Equipment => InventoryUnitCategory::Units,
        }
    }
}

/// How an item's stock is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryUnitCategory {
    Mass,
    Volume,
    Length,
    Pressure,
    Units,
}

/// Share of a CAS substance in an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasAmount {
    /// CAS entry id (`CAS...`).
    pub id: String,

    /// Lower bound, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl CasAmount {
    /// Creates an amount without bounds.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            min: None,
            max: None,
        }
    }

    /// Sets both bounds.
    #[must_use]
    pub const fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Reorder threshold at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMinimum {
    /// Location id.
    pub id: String,

    /// Location name, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Threshold, in `(0, 1e15)`.
    pub minimum: f64,
}

/// Regulatory and catalogue metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMetadata {
    /// Industry hazard identifiers.
    #[serde(rename = "IDH", default, skip_serializing_if = "Vec::is_empty")]
    pub idh: Vec<EntityLink>,

    /// Raw material safety number.
    #[serde(rename = "RSN", default, skip_serializing_if = "Option::is_none")]
    pub rsn: Option<String>,

    #[serde(rename = "RSNe", default, skip_serializing_if = "Option::is_none")]
    pub rsn_e: Option<String>,

    /// INCI name for cosmetic ingredients.
    #[serde(rename = "INCIName", default, skip_serializing_if = "Option::is_none")]
    pub inci_name: Option<String>,

    #[serde(rename = "substanceNumber", default, skip_serializing_if = "Option::is_none")]
    pub substance_number: Option<String>,

    #[serde(rename = "RMFMCode", default, skip_serializing_if = "Option::is_none")]
    pub rmfm_code: Option<String>,

    #[serde(rename = "productCode", default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    #[serde(rename = "articleNumber", default, skip_serializing_if = "Option::is_none")]
    pub article_number: Option<String>,

    #[serde(rename = "uvpNumber", default, skip_serializing_if = "Option::is_none")]
    pub uvp_number: Option<String>,

    /// Customs declaration code.
    #[serde(rename = "CuD", default, skip_serializing_if = "Option::is_none")]
    pub cud: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solubility: Option<String>,

    #[serde(rename = "potentialApplications", default, skip_serializing_if = "Option::is_none")]
    pub potential_applications: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,

    #[serde(rename = "storageRecommendation", default, skip_serializing_if = "Option::is_none")]
    pub storage_recommendation: Option<String>,

    #[serde(rename = "equipmentType", default, skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<EntityLink>,

    #[serde(rename = "articleStatus", default, skip_serializing_if = "Option::is_none")]
    pub article_status: Option<EntityLink>,
}

impl InventoryMetadata {
    /// (field, value, min length, max length)
    fn bounded(&self) -> [(&'static str, Option<&str>, usize, usize); 9] {
        [
            ("Metadata.RSN", self.rsn.as_deref(), 1, 50),
            ("Metadata.RSNe", self.rsn_e.as_deref(), 1, 50),
            ("Metadata.INCIName", self.inci_name.as_deref(), 1, 255),
            ("Metadata.substanceNumber", self.substance_number.as_deref(), 1, 255),
            ("Metadata.RMFMCode", self.rmfm_code.as_deref(), 1, 255),
            ("Metadata.productCode", self.product_code.as_deref(), 1, 40),
            ("Metadata.articleNumber", self.article_number.as_deref(), 0, 50),
            ("Metadata.uvpNumber", self.uvp_number.as_deref(), 0, 50),
            ("Metadata.CuD", self.cud.as_deref(), 0, 50),
        ]
    }
}

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Server-assigned id (`INV...`).
    #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Item name.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Kind of item.
    pub category: InventoryCategory,

    /// Stock measure.
    #[serde(rename = "unitCategory", default, skip_serializing_if = "Option::is_none")]
    pub unit_category: Option<InventoryUnitCategory>,

    /// Visibility.
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub security_class: Option<SecurityClass>,

    /// Manufacturer or supplier.
    #[serde(rename = "Company", default, skip_serializing_if = "Option::is_none")]
    pub company: Option<EntityLink>,

    /// Reorder thresholds per location.
    #[serde(
        rename = "Minimum",
        alias = "minimum",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub minimum: Vec<InventoryMinimum>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Composition.
    #[serde(rename = "Cas", default, skip_serializing_if = "Vec::is_empty")]
    pub cas: Vec<CasAmount>,

    #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InventoryMetadata>,

    #[serde(rename = "Tags", default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntityLink>,

    /// Owning project. Required when creating formulas.
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Formula id. Read-only.
    #[serde(rename = "formulaId", default, skip_serializing_if = "Option::is_none")]
    pub formula_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "Created", default, skip_serializing_if = "Option::is_none")]
    pub created: Option<AuditFields>,

    #[serde(rename = "Updated", default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<AuditFields>,
}

impl Inventory {
    /// Creates an unsaved item with the category's default unit category.
    #[must_use]
    pub fn new(name: impl Into<String>, category: InventoryCategory) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            category,
            unit_category: Some(category.default_unit_category()),
            security_class: None,
            company: None,
            minimum: Vec::new(),
            alias: None,
            cas: Vec::new(),
            metadata: None,
            tags: Vec::new(),
            project_id: None,
            formula_id: None,
            status: None,
            created: None,
            updated: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the company.
    #[must_use]
    pub fn with_company(mut self, company: EntityLink) -> Self {
        self.company = Some(company);
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: EntityLink) -> Self {
        self.tags.push(tag);
        self
    }

    /// Adds a CAS amount.
    #[must_use]
    pub fn with_cas(mut self, cas: CasAmount) -> Self {
        self.cas.push(cas);
        self
    }

    /// Sets the owning project.
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}

fn diff_cas(existing: &[CasAmount], updated: &[CasAmount]) -> Vec<PatchDatum> {
    let mut ops = Vec::new();
    for cas in updated {
        match existing.iter().find(|old| old.id == cas.id) {
            None => {
                let mut datum = PatchDatum::add("casId", Value::from(cas.id.as_str()));
                datum.min = cas.min.map(Value::from);
                datum.max = cas.max.map(Value::from);
                ops.push(datum);
            }
            Some(old) => {
                if old.max != cas.max {
                    ops.push(
                        PatchDatum::update("max", Value::from(old.max), Value::from(cas.max))
                            .with_entity(cas.id.as_str()),
                    );
                }
                if old.min != cas.min {
                    ops.push(
                        PatchDatum::update("min", Value::from(old.min), Value::from(cas.min))
                            .with_entity(cas.id.as_str()),
                    );
                }
            }
        }
    }
    for old in existing {
        if !updated.iter().any(|cas| cas.id == old.id) {
            ops.push(PatchDatum::bare(PatchOperation::Delete, "casId").with_entity(old.id.as_str()));
        }
    }
    ops
}

impl AlbertResource for Inventory {
    const NAME: &'static str = "Inventory";
    const PATH: &'static str = "/api/v3/inventories";
    const ID_PREFIX: &'static str = "INV";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "category"];
    const READ_ONLY_FIELDS: &'static [&'static str] = &["Created", "Updated", "formulaId"];
    const FILTERS: &'static [&'static str] = &["category", "cas", "manufacturer"];
    const PATCHABLE: &'static [&'static str] = &["name", "description", "unitCategory", "class"];
    const PAGINATION: PaginationScheme = PaginationScheme::Offset;
    const SPLIT_PATCH: bool = true;

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
            self.category != InventoryCategory::Formulas
                || self.project_id.is_some()
                || self.id.is_some(),
            "parentId",
            "a project id is required for formulas",
        );
        for minimum in &self.minimum {
            error.check(
                minimum.minimum > 0.0 && minimum.minimum < MAX_MINIMUM,
                "Minimum",
                "must be greater than 0 and less than 1e15",
            );
        }
        for cas in &self.cas {
            if let (Some(min), Some(max)) = (cas.min, cas.max) {
                error.check(min <= max, "Cas", "min must not exceed max");
            }
        }
        if let Some(metadata) = &self.metadata {
            for (field, value, min, max) in metadata.bounded() {
                if let Some(value) = value {
                    let len = value.chars().count();
                    error.check(
                        (min..=max).contains(&len),
                        field,
                        &format!("length must be between {min} and {max}"),
                    );
                }
            }
        }
        error.into_result()
    }

    fn patch_operations(existing: &Self, updated: &Self) -> Result<Vec<PatchDatum>, ValidationError> {
        let before = existing.to_wire()?;
        let after = updated.to_wire()?;

        let mut ops = diff_attributes(&before, &after, Self::PATCHABLE);
        ops.extend(diff_entity_link(&before, &after, "Company", "companyId"));
        ops.extend(diff_entity_links(&before, &after, "Tags", "tagId"));
        ops.extend(diff_cas(&existing.cas, &updated.cas));
        Ok(ops)
    }
}
