//! GitHub adapter.
//!
//! Implements the [`scm`] capability traits (`RepositoryService`,
//! `IssueService`, `PullRequestService`) against the GitHub REST API v3.
//! Works against github.com (`https://api.github.com/`) and GitHub
//! Enterprise (`https://<host>/api/v3/`); the base URL belongs to the
//! injected [`scm::Transport`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Wire structs, field layouts, path templates, the
//! webhook event table and the status-state table live here. The [`scm`]
//! crate never sees them.
//!
//! ## Pagination
//!
//! GitHub paginates with `page` / `per_page` query parameters and reports
//! further pages in the `Link` response header.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

use std::sync::Arc;

use scm::{normalize, ApiClient, Client, Driver, ListOptions, PageSignal, Response, Transport};

mod issue;
mod pull_request;
mod repo;
mod user;

pub use repo::{convert_from_state, convert_state, EVENT_TABLE};

/// Default API root for github.com.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";

/// GitHub implementation of every capability trait.
#[derive(Debug, Clone)]
pub struct GithubClient {
    api: ApiClient,
}

impl GithubClient {
    /// Creates an adapter sending requests through `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            api: ApiClient::new(Driver::Github, transport),
        }
    }

    /// Bundles this adapter into a provider-agnostic [`Client`].
    pub fn into_client(self) -> Client {
        Client::new(Driver::Github, Arc::new(self))
    }
}

/// Shorthand for `GithubClient::new(transport).into_client()`.
pub fn client(transport: Arc<dyn Transport>) -> Client {
    GithubClient::new(transport).into_client()
}

// ---------------------------------------------------------------------------
// Helpers shared by the service modules
// ---------------------------------------------------------------------------

/// Encodes list options as `page` / `per_page`, omitting unset values.
fn list_query(opts: &ListOptions) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if opts.page != 0 {
        query.push(("page".to_string(), opts.page.to_string()));
    }
    if opts.size != 0 {
        query.push(("per_page".to_string(), opts.size.to_string()));
    }
    query
}

/// Attaches the `Link`-header derived cursor to a list response.
fn paged(opts: &ListOptions, response: Response, count: usize) -> Response {
    let page = normalize(opts, PageSignal::Link(response.header("link")), count);
    response.with_page(page)
}

/// Percent-encodes a single path segment (label names may contain spaces
/// and slashes).
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
