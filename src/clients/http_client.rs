//! Transport session for the Albert API.
//!
//! [`HttpClient`] owns the connection pool, the base URL and the credential
//! provider. Every request resolves a bearer token, gets the standard headers
//! and runs through the retry loop described on [`HttpClient::request`].

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::auth::CredentialProvider;
use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::clients::retry::RetryPolicy;
use crate::config::{AlbertConfig, BaseUrl};

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const JSON: &str = "application/json";

/// Status codes that are retried for idempotent requests.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Status codes whose `Retry-After` header is honoured.
const RETRY_AFTER_STATUSES: [u16; 2] = [429, 503];

/// HTTP client bound to one Albert deployment.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`; one instance is shared by every collection
/// of an [`Albert`](crate::Albert) client.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: BaseUrl,
    credentials: CredentialProvider,
    retry_policy: RetryPolicy,
    user_agent: String,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a transport session from a config.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be built (e.g. TLS initialization failure).
    pub fn new(config: &AlbertConfig) -> Result<Self, HttpError> {
        let user_agent = build_user_agent(config.user_agent_prefix());

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(JSON));

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(user_agent.clone())
            .default_headers(default_headers)
            .build()?;

        let credentials =
            CredentialProvider::new(config.credentials(), client.clone(), config.base_url());

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
            credentials,
            retry_policy: config.retry_policy().clone(),
            user_agent,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the credential provider.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialProvider {
        &self.credentials
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Sends a request to the Albert API.
    ///
    /// Retry behaviour:
    ///
    /// - `GET` is retried on timeouts, connection errors and 429/500/502/503/504
    ///   responses, honouring `Retry-After` for 429 and 503
    /// - other methods are retried only when the connection could not be
    ///   established; any later failure surfaces as
    ///   [`HttpError::AmbiguousOutcome`]
    ///
    /// Successful responses with an empty body carry [`serde_json::Value::Null`].
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidRequest`] if the request fails validation
    /// - [`HttpError::Auth`] if no bearer token can be resolved
    /// - [`HttpError::Response`] for non-2xx responses that were not retried
    /// - [`HttpError::MaxRetries`] when retryable responses exhaust the policy
    /// - [`HttpError::InvalidJson`] when a 2xx body is not JSON
    /// - [`HttpError::AmbiguousOutcome`] / [`HttpError::Network`] for I/O failures
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.base_url.join(&request.path);
        let method = request.http_method;
        let token = self.credentials.resolve().await?;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let mut builder = self
                .client
                .request(method.as_reqwest(), &url)
                .bearer_auth(token.as_ref());
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.header(CONTENT_TYPE, JSON).body(body.to_string());
            }

            tracing::debug!(attempt, %method, %url, "sending HTTP request");

            let outcome = match builder.send().await {
                Ok(res) => Self::read_response(res).await,
                Err(err) => Err(err),
            };

            let (code, headers, body_text) = match outcome {
                Ok(parts) => parts,
                Err(err) => {
                    tracing::debug!(attempt, %method, %url, error = %err, "HTTP request failed");

                    if err.is_builder() {
                        return Err(HttpError::Network(err));
                    }
                    let retryable = if method.is_idempotent() {
                        should_retry_error(&err)
                    } else {
                        err.is_connect()
                    };
                    if retryable && self.retry_policy.should_retry(attempt) {
                        let delay = self.retry_policy.delay_for(attempt, None);
                        tracing::warn!(attempt, %method, %url, error = %err, ?delay, "retrying after network error");
                        sleep(delay).await;
                        continue;
                    }
                    if !method.is_idempotent() && !err.is_connect() {
                        return Err(HttpError::AmbiguousOutcome {
                            method: method.to_string(),
                            url,
                            reason: err.to_string(),
                        });
                    }
                    return Err(HttpError::Network(err));
                }
            };

            tracing::debug!(attempt, %method, %url, status = code, "received HTTP response");

            let ok = (200..=299).contains(&code);
            let body = if ok {
                parse_success_body(code, body_text)?
            } else {
                parse_error_body(body_text)
            };
            let response = HttpResponse::new(code, headers, body);

            if response.is_ok() {
                return Ok(response);
            }

            let retryable = method.is_idempotent() && RETRYABLE_STATUSES.contains(&code);
            if !retryable {
                return Err(HttpResponseError::new(code, response.body).into());
            }

            if !self.retry_policy.should_retry(attempt) {
                let error = HttpResponseError::new(code, response.body);
                if self.retry_policy.max_attempts() == 1 {
                    return Err(error.into());
                }
                return Err(MaxHttpRetriesExceededError {
                    code,
                    tries: attempt,
                    message: error.message,
                }
                .into());
            }

            let retry_after = if RETRY_AFTER_STATUSES.contains(&code) {
                response.retry_after()
            } else {
                None
            };
            let delay = self.retry_policy.delay_for(attempt, retry_after);
            tracing::warn!(
                attempt,
                %method,
                %url,
                status = code,
                request_id = ?response.request_id(),
                ?delay,
                "retrying after HTTP error"
            );
            sleep(delay).await;
        }
    }

    async fn read_response(
        res: reqwest::Response,
    ) -> Result<(u16, HashMap<String, Vec<String>>, String), reqwest::Error> {
        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body = res.text().await?;
        Ok((code, headers, body))
    }

    fn parse_response_headers(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

fn build_user_agent(prefix: Option<&str>) -> String {
    let prefix = prefix.map_or(String::new(), |p| format!("{p} | "));
    let rust_version = env!("CARGO_PKG_RUST_VERSION");
    format!("{prefix}albert-SDK V.{SDK_VERSION} | Rust {rust_version}")
}

fn parse_success_body(code: u16, text: String) -> Result<serde_json::Value, HttpError> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&text).map_err(|_| HttpError::InvalidJson { code, body: text })
}

fn parse_error_body(text: String) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect() || err.is_body()
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccessToken;

    fn config() -> AlbertConfig {
        AlbertConfig::builder()
            .token(AccessToken::new("test-token").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_uses_configured_base_url() {
        let client = HttpClient::new(&config()).unwrap();
        assert_eq!(client.base_url().as_ref(), "https://app.albertinvent.com");
    }

    #[test]
    fn test_user_agent_format() {
        let client = HttpClient::new(&config()).unwrap();
        assert!(client.user_agent().starts_with("albert-SDK V."));
        assert!(client.user_agent().contains("| Rust "));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = AlbertConfig::builder()
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();
        assert!(client.user_agent().starts_with("MyApp/1.0 | albert-SDK V."));
    }

    #[test]
    fn test_empty_success_body_is_null() {
        assert_eq!(
            parse_success_body(204, String::new()).unwrap(),
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_non_json_success_body_is_an_error() {
        let error = parse_success_body(200, "<html>".to_string()).unwrap_err();
        assert!(matches!(
            error,
            HttpError::InvalidJson { code: 200, ref body } if body == "<html>"
        ));
    }

    #[test]
    fn test_non_json_error_body_is_kept_as_string() {
        assert_eq!(
            parse_error_body("Bad Gateway".to_string()),
            serde_json::Value::String("Bad Gateway".to_string())
        );
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpClient>();
    }
}
