//! Typed Albert resources.
//!
//! Each type implements [`AlbertResource`](crate::rest::AlbertResource) and is
//! managed through a [`Collection`](crate::rest::Collection) obtained from the
//! [`Albert`](crate::Albert) facade.
//!
//! | Resource | Path | Paging | Updates |
//! |----------|------|--------|---------|
//! | [`Inventory`] | `/api/v3/inventories` | offset | one PATCH per operation |
//! | [`Tag`] | `/api/v3/tags` | key | PATCH |
//! | [`Company`] | `/api/v3/companies` | key | PATCH |
//! | [`Project`] | `/api/v3/projects` | key | PATCH |
//! | [`Unit`] | `/api/v3/units` | key | PATCH |
//! | [`Cas`] | `/api/v3/cas` | key | PATCH |
//! | [`Location`] | `/api/v3/locations` | key | PATCH |
//! | [`User`] | `/api/v3/users` | offset | PUT |

pub mod common;

mod cas;
mod company;
mod inventory;
mod location;
mod project;
mod tag;
mod unit;
mod user;

pub use cas::{Cas, CasCategory, Hazard};
pub use common::{AuditFields, EntityLink, SecurityClass, Status};
pub use company::Company;
pub use inventory::{
    CasAmount, Inventory, InventoryCategory, InventoryMetadata, InventoryMinimum,
    InventoryUnitCategory, MAX_MINIMUM,
};
pub use location::Location;
pub use project::{Project, ProjectCategory};
pub use tag::Tag;
pub use unit::{Unit, UnitCategory};
pub use user::User;
