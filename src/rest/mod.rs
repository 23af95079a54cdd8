//! Generic resource framework.
//!
//! - [`AlbertResource`]: per-resource schema, constants and the JSON boundary
//! - [`Collection`]: create, get, list, update and delete for one resource
//! - [`ListQuery`] / [`Paginator`]: filtered, lazily paged listings
//! - [`PatchPayload`]: the delta format of partial updates
//! - [`TrackedResource`]: local snapshots for pre-fetch-free updates
//! - [`ResourceError`]: the error taxonomy of every collection call
//!
//! Concrete resources live in [`crate::resources`].

mod collection;
mod errors;
mod pagination;
mod patch;
mod path;
mod query;
mod resource;
mod tracking;

pub use collection::{Collection, NAME_SCAN_PAGES, NAME_SCAN_PAGE_SIZE};
pub use errors::{FieldError, ResourceError, ValidationError};
pub use pagination::{Cursor, Page, PaginationScheme, Paginator};
pub use patch::{
    diff_attributes, diff_entity_link, diff_entity_links, PatchDatum, PatchOperation,
    PatchPayload,
};
pub use path::{item_path, list_path, ResourceOperation};
pub use query::{ListQuery, OrderBy, DEFAULT_PAGE_SIZE};
pub use resource::{AlbertResource, DeletePolicy, UpdateStrategy, ROOT_FIELD};
pub use tracking::TrackedResource;
