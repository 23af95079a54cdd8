//! The [`Albert`] client facade.

use std::sync::{Arc, OnceLock};

use crate::clients::{HttpClient, HttpError};
use crate::config::{AccessToken, AlbertConfig};
use crate::error::ConfigError;
use crate::resources::{Cas, Company, Inventory, Location, Project, Tag, Unit, User};
use crate::rest::Collection;

/// Entry point to the Albert API.
///
/// Owns one transport session and hands out one [`Collection`] per resource
/// type. Collections are created on first use and live as long as the
/// client, so the deleted-id set of e.g. [`tags`](Self::tags) persists across
/// calls.
///
/// # Example
///
/// ```rust,ignore
/// use albert::{AccessToken, Albert, AlbertConfig};
/// use albert::rest::ListQuery;
///
/// let config = AlbertConfig::builder()
///     .token(AccessToken::new("eyJ...")?)
///     .build()?;
/// let albert = Albert::new(config)?;
///
/// let mut items = albert.inventory().list(ListQuery::new().text("resin"))?;
/// while let Some(item) = items.next().await? {
///     println!("{}", item.name);
/// }
/// ```
#[derive(Debug)]
pub struct Albert {
    config: AlbertConfig,
    http: Arc<HttpClient>,
    inventory: OnceLock<Collection<Inventory>>,
    tags: OnceLock<Collection<Tag>>,
    companies: OnceLock<Collection<Company>>,
    projects: OnceLock<Collection<Project>>,
    units: OnceLock<Collection<Unit>>,
    cas: OnceLock<Collection<Cas>>,
    locations: OnceLock<Collection<Location>>,
    users: OnceLock<Collection<User>>,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Albert>();
};

macro_rules! collection_accessor {
    ($(#[$doc:meta])* $method:ident, $resource:ty) => {
        $(#[$doc])*
        #[must_use]
        pub fn $method(&self) -> &Collection<$resource> {
            self.$method
                .get_or_init(|| Collection::new(Arc::clone(&self.http)))
        }
    };
}

impl Albert {
    /// Creates a client from a config.
    ///
    /// No request is made; credentials are resolved on first use.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be built.
    pub fn new(config: AlbertConfig) -> Result<Self, HttpError> {
        let http = Arc::new(HttpClient::new(&config)?);
        tracing::debug!(base_url = %config.base_url(), "created Albert client");
        Ok(Self {
            config,
            http,
            inventory: OnceLock::new(),
            tags: OnceLock::new(),
            companies: OnceLock::new(),
            projects: OnceLock::new(),
            units: OnceLock::new(),
            cas: OnceLock::new(),
            locations: OnceLock::new(),
            users: OnceLock::new(),
        })
    }

    /// Creates a client configured from `ALBERT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ClientInitError::Config`] for invalid or incomplete
    /// environment values and [`ClientInitError::Http`] if the HTTP client
    /// cannot be built.
    pub fn from_env() -> Result<Self, ClientInitError> {
        let config = AlbertConfig::from_env()?.build()?;
        Ok(Self::new(config)?)
    }

    /// Returns the configuration this client was built from.
    #[must_use]
    pub const fn config(&self) -> &AlbertConfig {
        &self.config
    }

    /// Returns the shared transport session.
    #[must_use]
    pub fn http(&self) -> Arc<HttpClient> {
        Arc::clone(&self.http)
    }

    /// Replaces the bearer token used by every collection of this client.
    pub fn rotate_token(&self, token: AccessToken) {
        self.http.credentials().rotate(token);
    }

    collection_accessor!(
        /// Inventory items.
        inventory,
        Inventory
    );
    collection_accessor!(
        /// Tags.
        tags,
        Tag
    );
    collection_accessor!(
        /// Companies.
        companies,
        Company
    );
    collection_accessor!(
        /// Projects.
        projects,
        Project
    );
    collection_accessor!(
        /// Units of measure.
        units,
        Unit
    );
    collection_accessor!(
        /// CAS registry entries.
        cas,
        Cas
    );
    collection_accessor!(
        /// Locations.
        locations,
        Location
    );
    collection_accessor!(
        /// Users.
        users,
        User
    );
}

/// Error returned by [`Albert::from_env`].
#[derive(Debug, thiserror::Error)]
pub enum ClientInitError {
    /// The environment did not yield a valid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Http(#[from] HttpError),
}
