//! List query options.
//!
//! [`ListQuery`] holds the options every collection accepts (ordering, name
//! and text search, page size, continuation cursor) plus resource-specific
//! filters. Filters are checked against [`AlbertResource::FILTERS`] when the
//! query is turned into parameters, so an unsupported key fails before any
//! request is made.
//!
//! ```rust
//! use albert::rest::{ListQuery, OrderBy};
//!
//! let query = ListQuery::new()
//!     .order(OrderBy::Descending)
//!     .name("Resin")
//!     .filter("category", "RawMaterials")
//!     .limit(25);
//! assert_eq!(query.page_size(), 25);
//! ```

use crate::rest::errors::ResourceError;
use crate::rest::pagination::{Cursor, PaginationScheme};
use crate::rest::resource::AlbertResource;

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// `asc`
    #[default]
    Ascending,
    /// `desc`
    Descending,
}

impl OrderBy {
    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Options for a list call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    order: Option<OrderBy>,
    text: Option<String>,
    names: Vec<String>,
    exact_match: Option<bool>,
    limit: Option<u32>,
    cursor: Option<Cursor>,
    filters: Vec<(String, Vec<String>)>,
}

impl ListQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sort direction.
    #[must_use]
    pub const fn order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets a free-text search.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds a name to match. May be called repeatedly.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Requires names to match exactly.
    #[must_use]
    pub const fn exact_match(mut self, exact: bool) -> Self {
        self.exact_match = Some(exact);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resumes listing from a cursor returned by an earlier sequence.
    #[must_use]
    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Adds a value for a resource-specific filter. Values for the same key
    /// accumulate.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.filters.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.filters.push((key, vec![value])),
        }
        self
    }

    /// Returns the effective page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Returns the starting cursor, if any.
    #[must_use]
    pub const fn start_cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Returns the names to match.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Serializes the query for resource `R`, excluding the cursor.
    ///
    /// Parameters come out in a fixed order: `limit`, `orderBy`, `name`,
    /// `exactMatch`, `text`, then filters in the order `R` declares them.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidQuery`] for a zero page size, a
    /// cursor from the other pagination scheme, or a filter key `R` does not
    /// support.
    pub fn to_params<R: AlbertResource>(&self) -> Result<Vec<(String, String)>, ResourceError> {
        if self.limit == Some(0) {
            return Err(ResourceError::InvalidQuery {
                resource: R::NAME,
                key: "limit".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        match (&self.cursor, R::PAGINATION) {
            (Some(Cursor::Key(_)), PaginationScheme::Offset) => {
                return Err(ResourceError::InvalidQuery {
                    resource: R::NAME,
                    key: "cursor".to_string(),
                    reason: "is a key cursor but this resource pages by offset".to_string(),
                });
            }
            (Some(Cursor::Offset(_)), PaginationScheme::Key) => {
                return Err(ResourceError::InvalidQuery {
                    resource: R::NAME,
                    key: "cursor".to_string(),
                    reason: "is an offset cursor but this resource pages by key".to_string(),
                });
            }
            _ => {}
        }
        if let Some((key, _)) = self
            .filters
            .iter()
            .find(|(key, _)| !R::FILTERS.contains(&key.as_str()))
        {
            return Err(ResourceError::InvalidQuery {
                resource: R::NAME,
                key: key.clone(),
                reason: format!(
                    "is not a supported filter (expected one of: {})",
                    R::FILTERS.join(", ")
                ),
            });
        }

        let mut params = vec![("limit".to_string(), self.page_size().to_string())];
        if let Some(order) = self.order {
            params.push(("orderBy".to_string(), order.as_str().to_string()));
        }
        for name in &self.names {
            params.push(("name".to_string(), name.clone()));
        }
        if let Some(exact) = self.exact_match {
            params.push(("exactMatch".to_string(), exact.to_string()));
        }
        if let Some(text) = &self.text {
            params.push(("text".to_string(), text.clone()));
        }
        for declared in R::FILTERS {
            if let Some((key, values)) = self.filters.iter().find(|(k, _)| k == declared) {
                params.extend(values.iter().map(|v| (key.clone(), v.clone())));
            }
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
    }

    impl AlbertResource for Sample {
        const NAME: &'static str = "Sample";
        const PATH: &'static str = "/api/v3/samples";
        const ID_PREFIX: &'static str = "";
        const FILTERS: &'static [&'static str] = &["category", "cas"];

        fn id(&self) -> Option<&str> {
            None
        }
    }

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_default_params_only_carry_limit() {
        let params = ListQuery::new().to_params::<Sample>().unwrap();
        assert_eq!(pairs(&params), vec![("limit", "50")]);
    }

    #[test]
    fn test_filters_follow_declaration_order() {
        let params = ListQuery::new()
            .filter("cas", "CAS1")
            .filter("category", "Formulas")
            .filter("cas", "CAS2")
            .order(OrderBy::Descending)
            .name("a")
            .name("b")
            .exact_match(true)
            .text("resin")
            .limit(10)
            .to_params::<Sample>()
            .unwrap();

        assert_eq!(
            pairs(&params),
            vec![
                ("limit", "10"),
                ("orderBy", "desc"),
                ("name", "a"),
                ("name", "b"),
                ("exactMatch", "true"),
                ("text", "resin"),
                ("category", "Formulas"),
                ("cas", "CAS1"),
                ("cas", "CAS2"),
            ]
        );
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        let error = ListQuery::new()
            .filter("colour", "red")
            .to_params::<Sample>()
            .unwrap_err();
        assert!(matches!(
            error,
            ResourceError::InvalidQuery { resource: "Sample", ref key, .. } if key == "colour"
        ));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let error = ListQuery::new().limit(0).to_params::<Sample>().unwrap_err();
        assert!(matches!(error, ResourceError::InvalidQuery { ref key, .. } if key == "limit"));
    }

    #[test]
    fn test_cursor_from_other_scheme_is_rejected() {
        let error = ListQuery::new()
            .cursor(Cursor::Offset(20))
            .to_params::<Sample>()
            .unwrap_err();
        assert!(matches!(error, ResourceError::InvalidQuery { ref key, .. } if key == "cursor"));

        let params = ListQuery::new()
            .cursor(Cursor::Key("k3".to_string()))
            .to_params::<Sample>()
            .unwrap();
        assert_eq!(pairs(&params), vec![("limit", "50")]);
    }
}
