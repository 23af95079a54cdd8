//! Path building for resource collections.
//!
//! Every Albert resource lives under a collection path such as
//! `/api/v3/inventories`. Items are addressed as `{collection}/{id}` and
//! offset-paginated listings go through `{collection}/search`.
//!
//! ```rust
//! use albert::rest::{item_path, list_path, PaginationScheme};
//!
//! assert_eq!(item_path("/api/v3/tags", "TAG12"), "/api/v3/tags/TAG12");
//! assert_eq!(item_path("/api/v3/tags", "a b/c"), "/api/v3/tags/a%20b%2Fc");
//! assert_eq!(list_path("/api/v3/users", PaginationScheme::Offset), "/api/v3/users/search");
//! ```

use crate::clients::HttpMethod;
use crate::rest::PaginationScheme;

/// Operations a collection performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// `POST {collection}`.
    Create,
    /// `GET {collection}/{id}`.
    Get,
    /// `GET {collection}` or `GET {collection}/search`.
    List,
    /// `PATCH` or `PUT {collection}/{id}`.
    Update,
    /// `DELETE {collection}/{id}`.
    Delete,
}

impl ResourceOperation {
    /// Returns the default HTTP method for this operation.
    #[must_use]
    pub const fn default_http_method(&self) -> HttpMethod {
        match self {
            Self::Get | Self::List => HttpMethod::Get,
            Self::Create => HttpMethod::Post,
            Self::Update => HttpMethod::Patch,
            Self::Delete => HttpMethod::Delete,
        }
    }

    /// Returns the operation name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Builds the path of a single item, percent-encoding the id.
#[must_use]
pub fn item_path(collection: &str, id: &str) -> String {
    format!(
        "{}/{}",
        collection.trim_end_matches('/'),
        urlencoding::encode(id)
    )
}

/// Builds the listing path for a pagination scheme.
#[must_use]
pub fn list_path(collection: &str, scheme: PaginationScheme) -> String {
    let collection = collection.trim_end_matches('/');
    match scheme {
        PaginationScheme::Key => collection.to_string(),
        PaginationScheme::Offset => format!("{collection}/search"),
    }
}
