//! HTTP transport for Albert API communication.
//!
//! # Overview
//!
//! - [`HttpClient`]: the transport session (connection pool, auth, retries)
//! - [`HttpRequest`] / [`HttpRequestBuilder`]: a request to be sent
//! - [`HttpResponse`]: a parsed response
//! - [`HttpMethod`]: supported HTTP methods
//! - [`RetryPolicy`]: bounded exponential backoff with jitter
//! - [`HttpError`]: transport failures
//!
//! # Retry Behavior
//!
//! - **GET**: retried on timeouts, connection errors and 429/500/502/503/504,
//!   using `Retry-After` for 429 and 503 when present
//! - **POST / PATCH / PUT / DELETE**: retried only when the connection could
//!   not be established; a failure after sending surfaces as
//!   [`HttpError::AmbiguousOutcome`]
//!
//! # Example
//!
//! ```rust,ignore
//! use albert::clients::{HttpClient, HttpMethod, HttpRequest};
//!
//! let client = HttpClient::new(&config)?;
//! let request = HttpRequest::builder(HttpMethod::Get, "/api/v3/tags")
//!     .query_param("limit", "10")
//!     .build()?;
//! let response = client.request(request).await?;
//! ```

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod retry;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use retry::{
    RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_JITTER_FACTOR, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY,
};
