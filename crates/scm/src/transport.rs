//! Transport port and the request helper shared by every adapter.
//!
//! Adapters never touch sockets. They build a [`Request`] (vendor path, query,
//! JSON body) and hand it to [`ApiClient`], which runs it on the injected
//! [`Transport`] under the caller's [`Context`], classifies the status, and
//! decodes the body into the adapter's wire struct.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Context, Driver, Page, ScmError};

/// Response headers, keyed by lower-cased name.
pub type Headers = BTreeMap<String, Vec<String>>;

/// HTTP method of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider API request, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API root, without a leading `/`.
    pub path: String,
    /// Query parameters, encoded by the transport.
    pub query: Vec<(String, String)>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<serde_json::Value>,
}

impl Request {
    /// Creates a request with no query, headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `PUT path`
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// `PATCH path`
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends query parameters.
    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Appends a request header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Serializes `body` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ScmError> {
        let value = serde_json::to_value(body).map_err(|source| ScmError::Encode {
            path: self.path.clone(),
            source,
        })?;
        self.body = Some(value);
        Ok(self)
    }
}

/// What a [`Transport`] returns: the undecoded HTTP response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, keyed by lower-cased name.
    pub headers: Headers,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Response envelope returned alongside every result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, keyed by lower-cased name.
    pub headers: Headers,
    /// Normalized pagination cursor. Only list operations fill it in.
    pub page: Page,
}

impl Response {
    /// Builds the envelope for `raw`, dropping the body.
    pub fn from_raw(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            page: Page::default(),
        }
    }

    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Attaches a pagination cursor.
    pub fn with_page(self, page: Page) -> Self {
        Self { page, ..self }
    }
}

fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .get(&name.to_ascii_lowercase())
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// Performs HTTP requests on behalf of an adapter.
///
/// Implementations must be safe for concurrent use by many in-flight calls.
/// Network-level failures map to [`ScmError::Transport`]; any HTTP status,
/// including errors, is returned as a [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the raw response.
    async fn send(&self, request: Request) -> Result<RawResponse, ScmError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Shared request helper: context handling, status classification, decoding.
///
/// Holds only an immutable transport handle, so one instance serves any
/// number of concurrent calls.
#[derive(Clone)]
pub struct ApiClient {
    driver: Driver,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for `driver` over `transport`.
    pub fn new(driver: Driver, transport: Arc<dyn Transport>) -> Self {
        Self { driver, transport }
    }

    /// The provider this client talks to.
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// Sends `request` and returns the response whatever its status.
    ///
    /// For operations that interpret non-2xx statuses themselves.
    pub async fn probe(&self, ctx: &Context, request: Request) -> Result<RawResponse, ScmError> {
        debug!(
            driver = %self.driver,
            method = %request.method,
            path = %request.path,
            "sending request"
        );
        let raw = ctx.run(self.transport.send(request)).await?;
        debug!(driver = %self.driver, status = raw.status, "received response");
        Ok(raw)
    }

    /// Sends `request`, requiring a 2xx status. The body is ignored.
    pub async fn execute(&self, ctx: &Context, request: Request) -> Result<Response, ScmError> {
        let (_, response) = self.send(ctx, request).await?;
        Ok(response)
    }

    /// Sends `request`, requiring a 2xx status, and decodes the body as `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: Request,
    ) -> Result<(T, Response), ScmError> {
        let path = request.path.clone();
        let (body, response) = self.send(ctx, request).await?;
        let out = serde_json::from_slice(&body).map_err(|source| ScmError::Decode { path, source })?;
        Ok((out, response))
    }

    async fn send(&self, ctx: &Context, request: Request) -> Result<(Vec<u8>, Response), ScmError> {
        let method = request.method;
        let path = request.path.clone();
        let mut raw = self.probe(ctx, request).await?;
        check_status(method, &path, &raw)?;
        let body = std::mem::take(&mut raw.body);
        Ok((body, Response::from_raw(raw)))
    }
}

/// Maps a non-2xx response onto [`ScmError::NotFound`] or
/// [`ScmError::UnexpectedStatus`].
pub fn check_status(method: Method, path: &str, raw: &RawResponse) -> Result<(), ScmError> {
    match raw.status {
        200..=299 => Ok(()),
        404 => Err(ScmError::NotFound {
            path: path.to_string(),
        }),
        status => Err(unexpected_status(method, path, raw, status)),
    }
}

/// Builds [`ScmError::UnexpectedStatus`] for `raw`, extracting the provider's
/// error message and any `Retry-After` delay.
pub fn unexpected_status(method: Method, path: &str, raw: &RawResponse, status: u16) -> ScmError {
    let retry_after = header_value(&raw.headers, "retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    ScmError::UnexpectedStatus {
        status,
        method,
        path: path.to_string(),
        message: error_message(&raw.body),
        retry_after,
    }
}

/// Extracts a human-readable message from a vendor error body.
///
/// GitHub answers `{"message": "..."}`; Stash answers
/// `{"errors": [{"message": "..."}]}`.
fn error_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return String::new();
    };
    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }
    value
        .get("errors")
        .and_then(|errors| errors.as_array())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
