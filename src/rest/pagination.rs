//! Lazy pagination over list endpoints.
//!
//! Albert lists come in two shapes:
//!
//! - **Key**: `GET {collection}?limit=..&startKey=..` answering
//!   `{"Items": [...], "lastKey": "..."}`
//! - **Offset**: `GET {collection}/search?limit=..&offset=..` answering
//!   `{"Items": [...], "offset": n, "total": m}`
//!
//! A [`Paginator`] holds one page buffer and the cursor of the next page. It
//! fetches a page only when the buffer runs dry, so dropping it part way
//! through issues no further requests.
//!
//! ```rust,ignore
//! let mut tags = albert.tags().list(ListQuery::new().limit(100))?;
//! while let Some(tag) = tags.next().await? {
//!     println!("{}", tag.name);
//! }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use futures::stream::{self, Stream};
use serde_json::Value;

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::rest::errors::{ResourceError, ValidationError};
use crate::rest::resource::{AlbertResource, ROOT_FIELD};

/// How a resource's list endpoint pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaginationScheme {
    /// Opaque continuation key.
    #[default]
    Key,
    /// Numeric offset on a search endpoint.
    Offset,
}

/// Position of the next page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cursor {
    /// `startKey` value.
    Key(String),
    /// `offset` value.
    Offset(u64),
}

/// One page of results.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<R> {
    /// Items in server order.
    pub items: Vec<R>,
    /// Cursor of the following page, `None` on the last page.
    pub next: Option<Cursor>,
    /// Total match count, when the server reports one.
    pub total: Option<u64>,
}

/// A forward-only sequence of resources.
#[derive(Debug)]
pub struct Paginator<R> {
    http: Arc<HttpClient>,
    path: String,
    params: Vec<(String, String)>,
    scheme: PaginationScheme,
    page_size: u32,
    cursor: Option<Cursor>,
    buffer: VecDeque<R>,
    total: Option<u64>,
    done: bool,
}

impl<R: AlbertResource> Paginator<R> {
    pub(crate) fn new(
        http: Arc<HttpClient>,
        path: String,
        params: Vec<(String, String)>,
        page_size: u32,
        start: Option<Cursor>,
    ) -> Self {
        let scheme = R::PAGINATION;
        let cursor = match (scheme, start) {
            (_, Some(cursor)) => Some(cursor),
            (PaginationScheme::Offset, None) => Some(Cursor::Offset(0)),
            (PaginationScheme::Key, None) => None,
        };
        Self {
            http,
            path,
            params,
            scheme,
            page_size,
            cursor,
            buffer: VecDeque::new(),
            total: None,
            done: false,
        }
    }

    /// Returns the next item, fetching a page if the buffer is empty.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if a page request fails or an item does
    /// not decode. The paginator stays at the failed page, so calling again
    /// retries it.
    pub async fn next(&mut self) -> Result<Option<R>, ResourceError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if self.done {
                return Ok(None);
            }
            let page = self.fetch().await?;
            self.buffer.extend(page);
        }
    }

    /// Returns the rest of the current page, or fetches the next one.
    ///
    /// # Errors
    ///
    /// Same as [`next`](Self::next).
    pub async fn next_page(&mut self) -> Result<Option<Page<R>>, ResourceError> {
        if self.buffer.is_empty() {
            if self.done {
                return Ok(None);
            }
            let items = self.fetch().await?;
            self.buffer.extend(items);
        }
        Ok(Some(Page {
            items: self.buffer.drain(..).collect(),
            next: self.cursor(),
            total: self.total,
        }))
    }

    /// Cursor of the next unfetched page. `None` once the last page is in.
    ///
    /// Items still buffered precede this cursor.
    #[must_use]
    pub fn cursor(&self) -> Option<Cursor> {
        if self.done {
            None
        } else {
            self.cursor.clone()
        }
    }

    /// Total match count reported by the last page, if any.
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }

    /// Collects every remaining item.
    ///
    /// # Errors
    ///
    /// Same as [`next`](Self::next).
    pub async fn collect_all(mut self) -> Result<Vec<R>, ResourceError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Turns the paginator into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<R, ResourceError>> {
        stream::try_unfold(self, |mut pages| async move {
            Ok(pages.next().await?.map(|item| (item, pages)))
        })
    }

    async fn fetch(&mut self) -> Result<Vec<R>, ResourceError> {
        let mut builder =
            HttpRequest::builder(HttpMethod::Get, self.path.as_str()).query(self.params.clone());
        builder = match &self.cursor {
            Some(Cursor::Key(key)) => builder.query_param("startKey", key.as_str()),
            Some(Cursor::Offset(offset)) => builder.query_param("offset", offset.to_string()),
            None => builder,
        };
        let request = builder
            .build()
            .map_err(|e| ResourceError::Transport(HttpError::from(e)))?;

        tracing::debug!(resource = R::NAME, path = %self.path, cursor = ?self.cursor, "fetching page");

        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| ResourceError::from_http_error(e, R::NAME, None))?;

        let envelope = Envelope::parse(response.body).map_err(|message| {
            ValidationError::single(R::NAME, ROOT_FIELD, message)
        })?;
        let items = envelope
            .items
            .into_iter()
            .map(R::from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        self.advance(&items, envelope.last_key, envelope.offset, envelope.total);
        Ok(items)
    }

    /// Moves the cursor past a received page.
    ///
    /// Key pages continue while the server hands back a `lastKey`. Offset
    /// pages continue until `total` is reached, or, when the server reports
    /// no total, until a page comes back shorter than requested.
    fn advance(
        &mut self,
        items: &[R],
        last_key: Option<String>,
        offset: Option<u64>,
        total: Option<u64>,
    ) {
        let count = items.len() as u64;
        if total.is_some() {
            self.total = total;
        }
        if count == 0 {
            self.done = true;
            return;
        }
        match self.scheme {
            PaginationScheme::Key => match last_key {
                Some(key) => self.cursor = Some(Cursor::Key(key)),
                None => self.done = true,
            },
            PaginationScheme::Offset => {
                let start = offset.unwrap_or(match self.cursor {
                    Some(Cursor::Offset(current)) => current,
                    _ => 0,
                });
                let next = start + count;
                let exhausted = match total {
                    Some(total) => next >= total,
                    None => count < u64::from(self.page_size),
                };
                if exhausted {
                    self.done = true;
                } else {
                    self.cursor = Some(Cursor::Offset(next));
                }
            }
        }
    }
}

struct Envelope {
    items: Vec<Value>,
    last_key: Option<String>,
    offset: Option<u64>,
    total: Option<u64>,
}

impl Envelope {
    fn parse(body: Value) -> Result<Self, String> {
        match body {
            Value::Array(items) => Ok(Self {
                items,
                last_key: None,
                offset: None,
                total: None,
            }),
            Value::Null => Ok(Self {
                items: Vec::new(),
                last_key: None,
                offset: None,
                total: None,
            }),
            Value::Object(mut object) => {
                let items = match object.remove("Items").or_else(|| object.remove("items")) {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(_) => return Err("list envelope `Items` is not an array".to_string()),
                };
                let last_key = object
                    .get("lastKey")
                    .and_then(Value::as_str)
                    .filter(|key| !key.is_empty())
                    .map(ToString::to_string);
                Ok(Self {
                    items,
                    last_key,
                    offset: object.get("offset").and_then(Value::as_u64),
                    total: object.get("total").and_then(Value::as_u64),
                })
            }
            _ => Err("list response is neither an envelope nor an array".to_string()),
        }
    }
}
