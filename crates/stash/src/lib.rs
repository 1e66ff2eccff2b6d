//! Bitbucket Server ("Stash") adapter.
//!
//! Implements the [`scm`] capability traits against the Stash REST API
//! (`rest/api/1.0/...` and `rest/build-status/1.0/...`). The server root,
//! e.g. `https://stash.example.com/`, belongs to the injected
//! [`scm::Transport`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Wire structs, paths, the webhook event table, the
//! build-state table and the permission heuristic live here.
//!
//! ## Pagination
//!
//! Stash pages with `start` (item offset) and `limit` query parameters and
//! reports the end of the collection with `isLastPage` in the body envelope.
//!
//! ## Capability gaps
//!
//! Stash has no issue tracker, no combined status, no per-user permission
//! lookup and no labels. Those operations return
//! [`scm::ScmError::NotSupported`].

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

use std::sync::Arc;

use serde::Deserialize;

use scm::{normalize, split, ApiClient, Client, Driver, ListOptions, PageSignal, Response, Transport};

mod issue;
mod perms;
mod pull_request;
mod repo;
mod user;

pub use repo::{convert_from_state, convert_state, EVENT_TABLE};

/// Stash implementation of every capability trait.
#[derive(Debug, Clone)]
pub struct StashClient {
    api: ApiClient,
}

impl StashClient {
    /// Creates an adapter sending requests through `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            api: ApiClient::new(Driver::Stash, transport),
        }
    }

    /// Bundles this adapter into a provider-agnostic [`Client`].
    pub fn into_client(self) -> Client {
        Client::new(Driver::Stash, Arc::new(self))
    }
}

/// Shorthand for `StashClient::new(transport).into_client()`.
pub fn client(transport: Arc<dyn Transport>) -> Client {
    StashClient::new(transport).into_client()
}

// ---------------------------------------------------------------------------
// Helpers shared by the service modules
// ---------------------------------------------------------------------------

/// Paged collection envelope.
#[derive(Debug, Deserialize)]
struct WirePage<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
    #[serde(rename = "isLastPage", default)]
    is_last_page: Option<bool>,
}

/// `rest/api/1.0/projects/{namespace}/repos/{name}`.
fn repo_path(repo: &str) -> String {
    let (namespace, name) = split(repo);
    format!("rest/api/1.0/projects/{namespace}/repos/{name}")
}

/// Page size Stash applies when a request carries no `limit`.
const DEFAULT_LIMIT: u32 = 25;

/// Encodes list options as `start` / `limit`.
///
/// `start` is an item offset, so it is derived from the page number and size
/// and omitted for the first page. A zero size stands for the server default,
/// which is sent explicitly so every offset lines up with the page length.
fn list_query(opts: &ListOptions) -> Vec<(String, String)> {
    let limit = if opts.size == 0 { DEFAULT_LIMIT } else { opts.size };
    let mut query = Vec::new();
    if opts.page > 1 {
        let start = u64::from(opts.page - 1) * u64::from(limit);
        query.push(("start".to_string(), start.to_string()));
    }
    query.push(("limit".to_string(), limit.to_string()));
    query
}

/// [`list_query`] restricted to repositories the caller can read.
fn list_role_query(opts: &ListOptions) -> Vec<(String, String)> {
    let mut query = list_query(opts);
    query.push(("permission".to_string(), "REPO_READ".to_string()));
    query
}

/// Attaches the `isLastPage`-derived cursor to a list response.
fn paged(opts: &ListOptions, response: Response, is_last_page: Option<bool>, count: usize) -> Response {
    let page = normalize(opts, PageSignal::LastPage(is_last_page), count);
    response.with_page(page)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
