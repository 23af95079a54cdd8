//! CAS registry number resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rest::{AlbertResource, ValidationError};

use super::common::{AuditFields, Status};

/// Regulatory source of a CAS entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CasCategory {
    #[serde(rename = "User")]
    User,
    #[serde(rename = "Verisk")]
    Verisk,
    #[serde(rename = "TSCA - Public")]
    TscaPublic,
    #[serde(rename = "TSCA - Private")]
    TscaPrivate,
    #[serde(rename = "not TSCA")]
    NotTsca,
    #[serde(rename = "CAS linked to External Database")]
    External,
    #[serde(rename = "Unknown (Trade Secret)")]
    Unknown,
    #[serde(rename = "CL_Inventory Upload")]
    ClInventoryUpload,
}

/// A GHS hazard statement attached to a CAS entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    #[serde(rename = "subCategory", default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,

    #[serde(rename = "hCode", default, skip_serializing_if = "Option::is_none")]
    pub h_code: Option<String>,

    /// Category; the server sends either a label or a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,

    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub hazard_class: Option<String>,

    #[serde(rename = "hCodeText", default, skip_serializing_if = "Option::is_none")]
    pub h_code_text: Option<String>,
}

/// A CAS registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cas {
    /// Server-assigned id (`CAS...`).
    #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Registry number, e.g. `7732-18-5`.
    pub number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CasCategory>,

    /// SMILES notation.
    #[serde(rename = "casSmiles", default, skip_serializing_if = "Option::is_none")]
    pub smiles: Option<String>,

    #[serde(rename = "inchiKey", default, skip_serializing_if = "Option::is_none")]
    pub inchi_key: Option<String>,

    #[serde(rename = "iUpacName", default, skip_serializing_if = "Option::is_none")]
    pub iupac_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hazards: Vec<Hazard>,

    /// German water hazard class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wgk: Option<String>,

    /// European Community number.
    #[serde(rename = "ecListNo", default, skip_serializing_if = "Option::is_none")]
    pub ec_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "Created", default, skip_serializing_if = "Option::is_none")]
    pub created: Option<AuditFields>,

    #[serde(rename = "Updated", default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<AuditFields>,
}

impl Cas {
    /// Creates an unsaved entry for a registry number.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            id: None,
            number: number.into(),
            name: None,
            description: None,
            notes: None,
            category: None,
            smiles: None,
            inchi_key: None,
            iupac_name: None,
            hazards: Vec::new(),
            wgk: None,
            ec_number: None,
            status: None,
            created: None,
            updated: None,
        }
    }
}

/// Checks the `digits-dd-d` shape of a registry number and its check digit.
fn valid_cas_number(number: &str) -> bool {
    let parts: Vec<&str> = number.split('-').collect();
    let &[first, second, check] = parts.as_slice() else {
        return false;
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !(all_digits(first) && first.len() <= 7 && second.len() == 2 && all_digits(second))
        || check.len() != 1
        || !all_digits(check)
    {
        return false;
    }
    let digits: Vec<u32> = first
        .chars()
        .chain(second.chars())
        .filter_map(|c| c.to_digit(10))
        .collect();
    let sum: u32 = digits
        .iter()
        .rev()
        .zip(1_u32..)
        .map(|(digit, weight)| digit * weight)
        .sum();
    check.chars().next().and_then(|c| c.to_digit(10)) == Some(sum % 10)
}

impl AlbertResource for Cas {
    const NAME: &'static str = "Cas";
    const PATH: &'static str = "/api/v3/cas";
    const ID_PREFIX: &'static str = "CAS";
    const REQUIRED_FIELDS: &'static [&'static str] = &["number"];
    const FILTERS: &'static [&'static str] = &["number", "albertId"];
    const PATCHABLE: &'static [&'static str] = &["notes", "description", "casSmiles"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.number)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut error = ValidationError::new(Self::NAME);
        error.check(!self.number.trim().is_empty(), "number", "must not be empty");
        // Trade-secret entries carry placeholder numbers.
        if self.category != Some(CasCategory::Unknown) && self.number.contains('-') {
            error.check(
                valid_cas_number(self.number.trim()),
                "number",
                "is not a valid CAS registry number",
            );
        }
        error.into_result()
    }
}
