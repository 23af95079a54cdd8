//! The [`AlbertResource`] trait.
//!
//! A resource is a plain serde struct plus a set of associated constants that
//! tell the generic [`Collection`](crate::rest::Collection) where it lives,
//! how it is listed and filtered, and which attributes may be patched. The
//! trait also owns the JSON boundary: [`AlbertResource::from_wire`] is the
//! only place wire documents become typed models.
//!
//! # Example
//!
//! ```rust
//! use albert::rest::{AlbertResource, PaginationScheme};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Widget {
//!     #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
//!     id: Option<String>,
//!     name: String,
//! }
//!
//! impl AlbertResource for Widget {
//!     const NAME: &'static str = "Widget";
//!     const PATH: &'static str = "/api/v3/widgets";
//!     const ID_PREFIX: &'static str = "WID";
//!     const REQUIRED_FIELDS: &'static [&'static str] = &["name"];
//!     const PATCHABLE: &'static [&'static str] = &["name"];
//!
//!     fn id(&self) -> Option<&str> {
//!         self.id.as_deref()
//!     }
//! }
//!
//! let widget = Widget::from_wire(json!({"albertId": "WID1", "name": "Gear"})).unwrap();
//! assert_eq!(widget.name, "Gear");
//! assert_eq!(Widget::normalize_id("42"), "WID42");
//! assert!(Widget::from_wire(json!({"albertId": "WID1"})).is_err());
//! ```

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::rest::errors::{FieldError, ValidationError};
use crate::rest::pagination::PaginationScheme;
use crate::rest::patch::{diff_attributes, PatchDatum};

/// Field name used when an error cannot be attributed to a single field.
pub const ROOT_FIELD: &str = "<root>";

/// How a collection sends updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// `PATCH` with a [`PatchPayload`](crate::rest::PatchPayload) delta.
    #[default]
    Patch,
    /// `PUT` with the full document.
    Replace,
}

/// How a collection treats a not-found response to `DELETE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Surface [`ResourceError::NotFound`](crate::ResourceError::NotFound).
    #[default]
    Default,
    /// Treat not-found as success.
    IdempotentNotFound,
}

/// A typed Albert resource.
///
/// Implementors are serde structs whose field names match the wire schema.
/// Only [`NAME`](Self::NAME), [`PATH`](Self::PATH),
/// [`ID_PREFIX`](Self::ID_PREFIX) and [`id`](Self::id) are mandatory.
pub trait AlbertResource:
    Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync + 'static
{
    /// Resource type name used in errors and logs.
    const NAME: &'static str;

    /// Collection path, e.g. `/api/v3/inventories`.
    const PATH: &'static str;

    /// Wire key of the server-assigned id.
    const ID_FIELD: &'static str = "albertId";

    /// Prefix carried by every server-assigned id. Empty disables
    /// normalisation.
    const ID_PREFIX: &'static str;

    /// Wire keys that must be present and non-null in every document.
    const REQUIRED_FIELDS: &'static [&'static str] = &[];

    /// Wire keys assigned by the server and never sent.
    const READ_ONLY_FIELDS: &'static [&'static str] = &["Created", "Updated"];

    /// Resource-specific list filters, in the order they are serialized.
    const FILTERS: &'static [&'static str] = &[];

    /// Wire keys the default [`patch_operations`](Self::patch_operations)
    /// compares.
    const PATCHABLE: &'static [&'static str] = &[];

    /// Listing scheme.
    const PAGINATION: PaginationScheme = PaginationScheme::Key;

    /// Update transport.
    const UPDATE_STRATEGY: UpdateStrategy = UpdateStrategy::Patch;

    /// Not-found handling on delete.
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Default;

    /// Send each patch operation in its own request.
    const SPLIT_PATCH: bool = false;

    /// Wire key of an optimistic-concurrency revision, if the resource has one.
    const REVISION_FIELD: Option<&'static str> = None;

    /// Returns the server-assigned id, or `None` for unsaved models.
    fn id(&self) -> Option<&str>;

    /// Returns the display name used by name lookups.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Semantic checks beyond the wire schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every failing field.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Adds [`ID_PREFIX`](Self::ID_PREFIX) to `id` if it is missing.
    #[must_use]
    fn normalize_id(id: &str) -> String {
        let id = id.trim();
        if Self::ID_PREFIX.is_empty() || id.starts_with(Self::ID_PREFIX) {
            id.to_string()
        } else {
            format!("{}{id}", Self::ID_PREFIX)
        }
    }

    /// Parses a wire document.
    ///
    /// Required keys are checked first so that every missing one is reported
    /// together; type and enum mismatches are then attributed to the
    /// offending keys; finally [`validate`](Self::validate) runs.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the offending fields.
    fn from_wire(value: Value) -> Result<Self, ValidationError> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ValidationError::single(
                    Self::NAME,
                    ROOT_FIELD,
                    format!("expected a JSON object, got {}", json_kind(&other)),
                ))
            }
        };

        let mut missing = ValidationError::new(Self::NAME);
        for field in Self::REQUIRED_FIELDS {
            missing.check(
                object.get(*field).is_some_and(|v| !v.is_null()),
                field,
                "required field is missing",
            );
        }
        missing.into_result()?;

        let model: Self = match serde_json::from_value(Value::Object(object.clone())) {
            Ok(model) => model,
            Err(_) => {
                let mut error = ValidationError::new(Self::NAME);
                for field_error in locate_offenders::<Self>(object) {
                    error.push(field_error);
                }
                return Err(error);
            }
        };
        model.validate()?;
        Ok(model)
    }

    /// Serializes the model, including read-only fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the model cannot be represented as a
    /// JSON object.
    fn to_wire(&self) -> Result<Value, ValidationError> {
        match serde_json::to_value(self) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(other) => Err(ValidationError::single(
                Self::NAME,
                ROOT_FIELD,
                format!("serialized to {} instead of an object", json_kind(&other)),
            )),
            Err(e) => Err(ValidationError::single(Self::NAME, ROOT_FIELD, e.to_string())),
        }
    }

    /// Body for `POST`: the wire form without id and read-only fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if [`to_wire`](Self::to_wire) fails.
    fn create_payload(&self) -> Result<Value, ValidationError> {
        let mut value = self.to_wire()?;
        if let Value::Object(object) = &mut value {
            object.remove(Self::ID_FIELD);
            strip_read_only::<Self>(object);
        }
        Ok(value)
    }

    /// Body for `PUT`: the wire form without read-only fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if [`to_wire`](Self::to_wire) fails.
    fn replace_payload(&self) -> Result<Value, ValidationError> {
        let mut value = self.to_wire()?;
        if let Value::Object(object) = &mut value {
            strip_read_only::<Self>(object);
        }
        Ok(value)
    }

    /// Computes the PATCH operations turning `existing` into `updated`.
    ///
    /// The default compares [`PATCHABLE`](Self::PATCHABLE) keys.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if either model cannot be serialized.
    fn patch_operations(existing: &Self, updated: &Self) -> Result<Vec<PatchDatum>, ValidationError> {
        Ok(diff_attributes(
            &existing.to_wire()?,
            &updated.to_wire()?,
            Self::PATCHABLE,
        ))
    }

    /// Reads the revision from the wire form, if the resource has one.
    #[must_use]
    fn revision(&self) -> Option<Value> {
        let field = Self::REVISION_FIELD?;
        self.to_wire()
            .ok()?
            .get(field)
            .filter(|v| !v.is_null())
            .cloned()
    }
}

fn strip_read_only<R: AlbertResource>(object: &mut Map<String, Value>) {
    for field in R::READ_ONLY_FIELDS {
        object.remove(*field);
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

/// Lays the object out with one top-level entry per line.
///
/// Line 1 holds the opening brace, so entry `i` sits on line `i + 2` and the
/// closing brace on line `len + 2`.
fn one_entry_per_line(object: &Map<String, Value>) -> String {
    let mut text = String::from("{\n");
    let last = object.len().saturating_sub(1);
    for (index, (key, value)) in object.iter().enumerate() {
        text.push_str(&Value::String(key.clone()).to_string());
        text.push(':');
        text.push_str(&value.to_string());
        if index < last {
            text.push(',');
        }
        text.push('\n');
    }
    text.push('}');
    text
}

/// Error text without the ` at line N column M` suffix.
fn bare_message(error: &serde_json::Error) -> String {
    let message = error.to_string();
    let suffix = format!(" at line {} column {}", error.line(), error.column());
    if let Some(bare) = message.strip_suffix(&suffix) {
        return bare.to_string();
    }
    message
}

/// Finds the keys responsible for a decode failure.
///
/// The document is decoded from a layout with one entry per line, so the
/// error's line names the failing key. That key is recorded and removed and
/// decoding repeats until it succeeds or fails on something other than a
/// single entry.
fn locate_offenders<R: DeserializeOwned>(mut object: Map<String, Value>) -> Vec<FieldError> {
    let mut found: Vec<FieldError> = Vec::new();
    for _ in 0..=object.len() {
        let error = match serde_json::from_str::<R>(&one_entry_per_line(&object)) {
            Ok(_) => break,
            Err(e) => e,
        };
        let message = bare_message(&error);

        let culprit = error
            .line()
            .checked_sub(2)
            .and_then(|index| object.keys().nth(index))
            .cloned();

        match culprit {
            Some(key) => {
                object.remove(&key);
                found.push(FieldError::new(key, message));
            }
            None => {
                match missing_field(&message) {
                    Some(field) if !found.iter().any(|f| f.field == field) => {
                        found.push(FieldError::new(field, "required field is missing"));
                    }
                    Some(_) => {}
                    None => found.push(FieldError::new(ROOT_FIELD, message)),
                }
                break;
            }
        }
    }

    if found.is_empty() {
        found.push(FieldError::new(ROOT_FIELD, "document could not be decoded"));
    }
    found
}
