//! # Albert API Rust SDK
//!
//! A Rust SDK for the Albert inventory and project management API, providing
//! type-safe configuration, bearer-token authentication, a retrying HTTP
//! transport and typed CRUD collections for every supported resource.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`AlbertConfig`] and [`AlbertConfigBuilder`]
//! - Validated newtypes for the base URL and credentials
//! - Static tokens or OAuth client credentials with JWT-expiry caching via [`auth`]
//! - An async HTTP client with bounded retries via [`clients`]
//! - One generic [`rest::Collection`] per resource, with lazy pagination,
//!   name lookups and PATCH delta updates
//! - Typed resource models with a fallible JSON boundary via [`resources`]
//!
//! ## Quick Start
//!
//! ```rust
//! use albert::{AccessToken, AlbertConfig, BaseUrl};
//!
//! let config = AlbertConfig::builder()
//!     .base_url(BaseUrl::new("https://app.albertinvent.com").unwrap())
//!     .token(AccessToken::new("eyJhbGciOi...").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://app.albertinvent.com");
//! ```
//!
//! ## Client Credentials
//!
//! ```rust,ignore
//! use albert::{Albert, AlbertConfig, ClientId, ClientSecret};
//!
//! let config = AlbertConfig::builder()
//!     .client_credentials(ClientId::new("my-client")?, ClientSecret::new("s3cret")?)
//!     .build()?;
//!
//! // The token is exchanged on the first request and cached until it expires.
//! let albert = Albert::new(config)?;
//! ```
//!
//! ## Working with Resources
//!
//! ```rust,ignore
//! use albert::resources::{Inventory, InventoryCategory};
//! use albert::rest::{ListQuery, TrackedResource};
//! use albert::Albert;
//!
//! let albert = Albert::from_env()?;
//!
//! // Create
//! let item = albert
//!     .inventory()
//!     .create(&Inventory::new("Titanium dioxide", InventoryCategory::RawMaterials))
//!     .await?;
//!
//! // List lazily, page by page
//! let mut pages = albert
//!     .inventory()
//!     .list(ListQuery::new().text("dioxide").filter("category", "RawMaterials"))?;
//! while let Some(found) = pages.next().await? {
//!     println!("{}", found.name);
//! }
//!
//! // Update only what changed
//! let mut tracked = TrackedResource::from_existing(item);
//! tracked.description = Some("Rutile grade".to_string());
//! albert.inventory().update_tracked(&mut tracked).await?;
//!
//! // Delete
//! albert.inventory().delete(tracked.id.as_deref().unwrap_or_default()).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: newtypes and models validate on construction
//! - **Thread-safe**: all client types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime
//! - **Live calls**: collections never cache resources

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod resources;
pub mod rest;

mod client;

pub use client::{Albert, ClientInitError};

// Re-export configuration types at crate root for convenience
pub use config::{AccessToken, AlbertConfig, AlbertConfigBuilder, BaseUrl, ClientId, ClientSecret};
pub use error::ConfigError;

// Re-export transport types
pub use clients::{HttpClient, HttpError, HttpMethod, RetryPolicy};

// Re-export authentication types
pub use auth::{AuthError, Credential, CredentialSource};

// Re-export the resource error taxonomy
pub use rest::{FieldError, ResourceError, ValidationError};
