//! Snapshot-based change tracking.
//!
//! [`TrackedResource<R>`] keeps the state a resource had when it was loaded
//! (or last saved) next to the copy being edited. The collection's
//! [`update_tracked`](crate::rest::Collection::update_tracked) diffs the two
//! locally instead of fetching the server state first, and sends nothing when
//! they are equal.
//!
//! # Example
//!
//! ```rust
//! use albert::resources::Tag;
//! use albert::rest::TrackedResource;
//!
//! let tag = Tag::new("solvent").with_id("TAG1");
//! let mut tracked = TrackedResource::from_existing(tag);
//! assert!(!tracked.is_dirty());
//!
//! tracked.name = "solvents".to_string();
//! assert!(tracked.is_dirty());
//! assert_eq!(tracked.changed_fields(), vec!["name".to_string()]);
//!
//! tracked.mark_clean();
//! assert!(!tracked.is_dirty());
//! ```

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use crate::rest::errors::ValidationError;
use crate::rest::patch::PatchDatum;
use crate::rest::resource::AlbertResource;

/// A resource plus the snapshot it is compared against.
///
/// Reads and writes go through `Deref`/`DerefMut`.
#[derive(Debug, Clone)]
pub struct TrackedResource<R> {
    resource: R,
    original: Option<R>,
}

impl<R: AlbertResource> TrackedResource<R> {
    /// Tracks a resource that has not been saved. It is always dirty.
    #[must_use]
    pub const fn new(resource: R) -> Self {
        Self {
            resource,
            original: None,
        }
    }

    /// Tracks a loaded resource; its current state becomes the snapshot.
    #[must_use]
    pub fn from_existing(resource: R) -> Self {
        Self {
            original: Some(resource.clone()),
            resource,
        }
    }

    /// Returns `true` if the resource differs from its snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.original.as_ref() != Some(&self.resource)
    }

    /// Returns `true` if there is no snapshot.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.original.is_none()
    }

    /// Returns the snapshot, if any.
    #[must_use]
    pub const fn original(&self) -> Option<&R> {
        self.original.as_ref()
    }

    /// Wire keys whose values differ from the snapshot, in sorted order.
    ///
    /// For new resources every present key is reported.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<String> {
        let current = self.resource.to_wire().unwrap_or(Value::Null);
        let original = self
            .original
            .as_ref()
            .and_then(|r| r.to_wire().ok())
            .unwrap_or(Value::Null);
        diff_keys(&original, &current)
    }

    /// PATCH operations turning the snapshot into the current state.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if there is no snapshot or a model fails
    /// to serialize.
    pub fn patch_operations(&self) -> Result<Vec<PatchDatum>, ValidationError> {
        let original = self.original.as_ref().ok_or_else(|| {
            ValidationError::single(R::NAME, R::ID_FIELD, "resource has not been saved")
        })?;
        R::patch_operations(original, &self.resource)
    }

    /// Makes the current state the snapshot.
    pub fn mark_clean(&mut self) {
        self.original = Some(self.resource.clone());
    }

    /// Replaces both the resource and the snapshot with `saved`.
    pub fn reset(&mut self, saved: R) {
        self.original = Some(saved.clone());
        self.resource = saved;
    }

    /// Returns the tracked resource.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.resource
    }
}

fn diff_keys(original: &Value, current: &Value) -> Vec<String> {
    let empty = serde_json::Map::new();
    let before = original.as_object().unwrap_or(&empty);
    let after = current.as_object().unwrap_or(&empty);

    let mut keys: Vec<String> = before
        .keys()
        .chain(after.keys())
        .filter(|key| {
            let old = before.get(*key).filter(|v| !v.is_null());
            let new = after.get(*key).filter(|v| !v.is_null());
            old != new
        })
        .cloned()
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

impl<R> Deref for TrackedResource<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

impl<R> DerefMut for TrackedResource<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.resource
    }
}
