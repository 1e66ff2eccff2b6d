//! HTTP transport for the provider adapters.
//!
//! [`HttpTransport`] implements [`scm::Transport`] on top of `reqwest`. It
//! owns everything network-related: base-URL joining, authentication, the
//! user agent, timeouts and header collection. Adapters only see
//! [`scm::RawResponse`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The [`config`] module holds the TOML-backed
//! [`ClientConfig`] used to build a transport.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use tracing::{debug, debug_span, Instrument};
use url::Url;
use uuid::Uuid;

use scm::{Headers, Method, RawResponse, Request, ScmError, Transport};

pub mod config;

pub use config::{ClientConfig, ConfigError, DEFAULT_CONFIG_PATH, TOKEN_ENV};

/// `reqwest`-backed [`Transport`].
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Builds a transport from `config`. `config.base_url` must be set.
    pub fn new(config: &ClientConfig) -> Result<Self, ScmError> {
        let raw = config.base_url.as_deref().ok_or_else(|| ScmError::Configuration {
            message: format!("no base_url configured for the {} driver", config.driver),
        })?;
        let base_url = normalize_base_url(raw)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ScmError::Configuration {
                    message: "token contains characters not allowed in a header".to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
            ScmError::Configuration {
                message: format!("invalid user agent '{}'", config.user_agent),
            }
        })?;
        headers.insert(USER_AGENT, user_agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ScmError::transport("failed to build HTTP client", e))?;

        Ok(Self { client, base_url })
    }

    /// The API root requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, request: &Request) -> Result<Url, ScmError> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|e| ScmError::transport(format!("invalid request path '{}'", request.path), e))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

/// Parses `raw` and guarantees a trailing `/` so relative paths append to
/// the API root instead of replacing its last segment.
fn normalize_base_url(raw: &str) -> Result<Url, ScmError> {
    let mut url = Url::parse(raw).map_err(|e| ScmError::Configuration {
        message: format!("invalid base_url '{raw}': {e}"),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn collect_headers(headers: &HeaderMap) -> Headers {
    let mut out = Headers::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            out.entry(name.as_str().to_ascii_lowercase())
                .or_default()
                .push(value.to_string());
        }
    }
    out
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, ScmError> {
        let request_id = Uuid::new_v4();
        let span = debug_span!(
            "http_request",
            request_id = %request_id,
            method = %request.method,
            path = %request.path,
        );

        async move {
            let url = self.url_for(&request)?;
            let mut builder = self
                .client
                .request(to_reqwest_method(request.method), url)
                .header("X-Request-Id", request_id.to_string());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| ScmError::transport("request failed", e))?;
            let status = response.status().as_u16();
            let headers = collect_headers(response.headers());
            let body = response
                .bytes()
                .await
                .map_err(|e| ScmError::transport("failed to read response body", e))?
                .to_vec();
            debug!(status, bytes = body.len(), "response received");

            Ok(RawResponse {
                status,
                headers,
                body,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
