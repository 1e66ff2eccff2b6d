//! Provider-agnostic domain for source-code hosting APIs.
//!
//! This crate contains the shared entity model, the capability traits every
//! provider adapter implements, the transport port adapters send requests
//! through, and the pagination normalizer. Adapter crates (`github`, `stash`)
//! implement the traits defined here; they never add entity types.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate performs no network I/O. It
//! defines *what* a provider must supply; adapter crates define *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Opaque ids and the `namespace/name` parsing contract |
//! | [`types`] | Shared value types (`Driver`, `User`, `Perm`, `ListOptions`, ...) |
//! | [`repository`] | Repository, webhook and commit-status entities, event mapping |
//! | [`issue`] | Issue and comment entities |
//! | [`pull_request`] | Pull request entities |
//! | [`pagination`] | Page cursor normalization |
//! | [`context`] | Cancellation and deadlines |
//! | [`transport`] | `Transport` port and the shared `ApiClient` |
//! | [`services`] | Capability traits and the `Client` bundle |
//! | [`errors`] | `ScmError` and `RetryPolicy` |

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod context;
pub mod errors;
pub mod identifiers;
pub mod issue;
pub mod pagination;
pub mod pull_request;
pub mod repository;
pub mod services;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export everything at the crate root for ergonomic usage by adapter crates.
pub use context::{CancelHandle, Context};
pub use errors::{BoxError, RetryPolicy, ScmError};
pub use identifiers::{join, split, HookId, RepoId, RepoRef};
pub use issue::{Comment, CommentInput, Issue, IssueInput, IssueListOptions, ListedIssueEvent};
pub use pagination::{collect_all, normalize, parse_link_header, Links, Page, PageSignal};
pub use pull_request::{PullRequest, PullRequestListOptions};
pub use repository::{
    map_events, CombinedStatus, EventTable, Hook, HookEventKind, HookEvents, HookInput,
    Repository, State, Status, StatusInput,
};
pub use services::{Client, IssueService, PullRequestService, Reply, RepositoryService};
pub use transport::{ApiClient, Headers, Method, RawResponse, Request, Response, Transport};
pub use types::{Driver, Label, ListOptions, Perm, Timestamp, User};
