//! Authentication for the Albert API.
//!
//! # Overview
//!
//! - [`Credential`]: a bearer token plus its [`CredentialSource`]
//! - [`ClientCredentials`]: an OAuth client id/secret pair
//! - [`CredentialConfig`]: whichever of the two a client was configured with
//! - [`CredentialProvider`]: resolves the token for each request, exchanging
//!   client credentials and caching the JWT until shortly before it expires
//! - [`AuthError`]: resolution failures
//!
//! The provider is owned by the transport; callers normally only touch it via
//! [`Albert::rotate_token`](crate::Albert::rotate_token).

mod credentials;
mod errors;
mod provider;

pub use credentials::{ClientCredentials, Credential, CredentialConfig, CredentialSource};
pub use errors::AuthError;
pub use provider::{decode_expiry, CredentialProvider, TOKEN_PATH};
