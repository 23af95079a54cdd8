//! PATCH delta payloads.
//!
//! Albert applies partial updates as a list of attribute operations:
//!
//! ```json
//! {"data": [{"operation": "update", "attribute": "name", "oldValue": "a", "newValue": "b"}]}
//! ```
//!
//! The helpers here compute those operations from two wire documents. They are
//! used by the default [`AlbertResource::patch_operations`] and by resources
//! whose linked entities need bespoke operations.
//!
//! [`AlbertResource::patch_operations`]: crate::rest::AlbertResource::patch_operations

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a single patch operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    /// The attribute was absent and now has a value.
    Add,
    /// The attribute changed value.
    Update,
    /// The attribute (or a linked entity) was removed.
    Delete,
}

/// One attribute change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDatum {
    /// What kind of change this is.
    pub operation: PatchOperation,
    /// Wire name of the attribute.
    pub attribute: String,
    /// Id of the linked entity the change applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Previous value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// New value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    /// Lower bound, for ranged links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    /// Upper bound, for ranged links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
}

impl PatchDatum {
    /// An `add` of `new_value` to `attribute`.
    #[must_use]
    pub fn add(attribute: impl Into<String>, new_value: Value) -> Self {
        Self::bare(PatchOperation::Add, attribute).with_new(new_value)
    }

    /// An `update` of `attribute` from `old_value` to `new_value`.
    #[must_use]
    pub fn update(attribute: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        Self::bare(PatchOperation::Update, attribute)
            .with_old(old_value)
            .with_new(new_value)
    }

    /// A `delete` of `attribute`, recording the value being removed.
    #[must_use]
    pub fn delete(attribute: impl Into<String>, old_value: Value) -> Self {
        Self::bare(PatchOperation::Delete, attribute).with_old(old_value)
    }

    /// An operation with no values attached.
    #[must_use]
    pub fn bare(operation: PatchOperation, attribute: impl Into<String>) -> Self {
        Self {
            operation,
            attribute: attribute.into(),
            entity_id: None,
            old_value: None,
            new_value: None,
            min: None,
            max: None,
        }
    }

    /// Sets the entity the change applies to.
    #[must_use]
    pub fn with_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Sets the previous value.
    #[must_use]
    pub fn with_old(mut self, value: Value) -> Self {
        self.old_value = Some(value);
        self
    }

    /// Sets the new value.
    #[must_use]
    pub fn with_new(mut self, value: Value) -> Self {
        self.new_value = Some(value);
        self
    }

    /// Sets the range bounds.
    #[must_use]
    pub fn with_range(mut self, min: Value, max: Value) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// The body of a PATCH request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchPayload {
    /// Operations, applied in order.
    pub data: Vec<PatchDatum>,
}

impl PatchPayload {
    /// Wraps a list of operations.
    #[must_use]
    pub const fn new(data: Vec<PatchDatum>) -> Self {
        Self { data }
    }

    /// Returns `true` if there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn present<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|v| !v.is_null())
}

/// Diffs plain attributes between two wire documents.
///
/// Absent and `null` are equivalent. A value appearing yields `add`, a value
/// changing yields `update` and a value disappearing yields `delete`.
///
/// ```rust
/// use albert::rest::{diff_attributes, PatchOperation};
/// use serde_json::json;
///
/// let before = json!({"name": "Resin", "description": null, "class": "shared"});
/// let after = json!({"name": "Resin B", "description": "Clear", "class": "shared"});
///
/// let ops = diff_attributes(&before, &after, &["name", "description", "class"]);
/// assert_eq!(ops.len(), 2);
/// assert_eq!(ops[0].operation, PatchOperation::Update);
/// assert_eq!(ops[1].operation, PatchOperation::Add);
/// ```
#[must_use]
pub fn diff_attributes(existing: &Value, updated: &Value, attributes: &[&str]) -> Vec<PatchDatum> {
    attributes
        .iter()
        .filter_map(|attribute| {
            match (present(existing, attribute), present(updated, attribute)) {
                (None, Some(new)) => Some(PatchDatum::add(*attribute, new.clone())),
                (Some(old), Some(new)) if old != new => {
                    Some(PatchDatum::update(*attribute, old.clone(), new.clone()))
                }
                (Some(old), None) => Some(PatchDatum::delete(*attribute, old.clone())),
                _ => None,
            }
        })
        .collect()
}

fn link_id(link: &Value) -> Option<&str> {
    link.get("id").and_then(Value::as_str)
}

/// Diffs a single linked entity (`{"id": ...}` under `field`), emitting
/// operations on `attribute`.
///
/// ```rust
/// use albert::rest::{diff_entity_link, PatchOperation};
/// use serde_json::json;
///
/// let before = json!({"Company": {"id": "COM1", "name": "Acme"}});
/// let after = json!({"Company": {"id": "COM2", "name": "Globex"}});
///
/// let ops = diff_entity_link(&before, &after, "Company", "companyId");
/// assert_eq!(ops[0].operation, PatchOperation::Update);
/// assert_eq!(ops[0].new_value, Some(json!("COM2")));
/// ```
#[must_use]
pub fn diff_entity_link(
    existing: &Value,
    updated: &Value,
    field: &str,
    attribute: &str,
) -> Vec<PatchDatum> {
    let old = present(existing, field).and_then(link_id);
    let new = present(updated, field).and_then(link_id);
    match (old, new) {
        (None, Some(new)) => vec![PatchDatum::add(attribute, Value::from(new))],
        (Some(old), Some(new)) if old != new => vec![PatchDatum::update(
            attribute,
            Value::from(old),
            Value::from(new),
        )],
        (Some(old), None) => vec![PatchDatum::delete(attribute, Value::from(old))],
        _ => Vec::new(),
    }
}

/// Diffs a list of linked entities under `field` as set membership.
///
/// Links present only in `updated` become `add`, links present only in
/// `existing` become `delete`. Order follows the documents.
#[must_use]
pub fn diff_entity_links(
    existing: &Value,
    updated: &Value,
    field: &str,
    attribute: &str,
) -> Vec<PatchDatum> {
    let ids = |doc: &Value| -> Vec<String> {
        present(doc, field)
            .and_then(Value::as_array)
            .map(|links| {
                links
                    .iter()
                    .filter_map(link_id)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    let old = ids(existing);
    let new = ids(updated);

    let added = new
        .iter()
        .filter(|id| !old.contains(id))
        .map(|id| PatchDatum::add(attribute, Value::from(id.as_str())));
    let removed = old
        .iter()
        .filter(|id| !new.contains(id))
        .map(|id| PatchDatum::delete(attribute, Value::from(id.as_str())));
    added.chain(removed).collect()
}
