//! Repository, webhook and commit-status entities.
//!
//! Webhook registration and commit-status writes both need a per-provider
//! vocabulary translation. The vocabularies live in the adapters; this module
//! holds the provider-independent side and the helpers that apply a table.

use serde::{Deserialize, Serialize};

use crate::{HookId, Perm, RepoId, Timestamp};

/// A repository hosted by a provider.
///
/// `namespace` + `name` uniquely address the repository within a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Provider-assigned identifier.
    pub id: RepoId,
    /// Owner, organisation or project key.
    pub namespace: String,
    /// Repository name (slug on Stash).
    pub name: String,
    /// `namespace/name`, as reported by the provider where it has one.
    pub full_name: String,
    /// Whether the repository is hidden from anonymous users.
    pub private: bool,
    /// Web URL.
    pub link: String,
    /// HTTP(S) clone URL, without credentials.
    pub clone: String,
    /// SSH clone URL.
    pub clone_ssh: String,
    /// Default branch name.
    pub branch: String,
    /// Permission snapshot for the authenticated user, if the provider
    /// returned one with the repository.
    pub perm: Option<Perm>,
    /// Creation time, if known.
    pub created: Option<Timestamp>,
    /// Last update time, if known.
    pub updated: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

/// A webhook registered on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    /// Provider-assigned identifier.
    pub id: HookId,
    /// Hook name. GitHub always reports `"web"`.
    pub name: String,
    /// Whether deliveries are enabled.
    pub active: bool,
    /// Delivery URL.
    pub target: String,
    /// Raw vendor event names the hook is registered for.
    pub events: Vec<String>,
}

/// Provider-independent selection of webhook triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookEvents {
    /// Commits pushed to any ref.
    pub push: bool,
    /// Pull request lifecycle.
    pub pull_request: bool,
    /// Comments on pull requests.
    pub pull_request_comment: bool,
    /// Issue lifecycle.
    pub issue: bool,
    /// Comments on issues.
    pub issue_comment: bool,
    /// Branch creation and deletion.
    pub branch: bool,
    /// Tag creation and deletion.
    pub tag: bool,
}

/// One flag of [`HookEvents`], used as the key of adapter event tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEventKind {
    /// [`HookEvents::push`]
    Push,
    /// [`HookEvents::pull_request`]
    PullRequest,
    /// [`HookEvents::pull_request_comment`]
    PullRequestComment,
    /// [`HookEvents::issue`]
    Issue,
    /// [`HookEvents::issue_comment`]
    IssueComment,
    /// [`HookEvents::branch`]
    Branch,
    /// [`HookEvents::tag`]
    Tag,
}

impl HookEvents {
    /// Returns whether the flag for `kind` is set.
    pub fn contains(&self, kind: HookEventKind) -> bool {
        match kind {
            HookEventKind::Push => self.push,
            HookEventKind::PullRequest => self.pull_request,
            HookEventKind::PullRequestComment => self.pull_request_comment,
            HookEventKind::Issue => self.issue,
            HookEventKind::IssueComment => self.issue_comment,
            HookEventKind::Branch => self.branch,
            HookEventKind::Tag => self.tag,
        }
    }
}

/// A vendor event table: each vendor event name with the shared flags that
/// select it.
///
/// Keyed by vendor name so one flag can expand to several names and several
/// flags can collapse onto one name.
pub type EventTable = &'static [(&'static str, &'static [HookEventKind])];

/// Maps a [`HookEvents`] selection to vendor event names through `table`.
///
/// Output follows table order, so it does not depend on which fields were
/// set first, and contains each vendor name at most once.
pub fn map_events(table: EventTable, events: &HookEvents) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(_, kinds)| kinds.iter().any(|kind| events.contains(*kind)))
        .map(|(name, _)| *name)
        .collect()
}

/// Input for registering a webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookInput {
    /// Hook name. Ignored by providers that fix the name.
    pub name: String,
    /// Delivery URL.
    pub target: String,
    /// Shared secret used to sign deliveries.
    pub secret: String,
    /// Provider-independent trigger selection.
    pub events: HookEvents,
    /// Vendor event names passed through unmodified.
    pub native_events: Vec<String>,
    /// Skip TLS verification when delivering.
    pub skip_verify: bool,
}

impl HookInput {
    /// Resolves the vendor event list to register: `native_events` followed
    /// by the mapped selection, without duplicates.
    pub fn resolve_events(&self, table: EventTable) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::new();
        let mapped = map_events(table, &self.events);
        let candidates = self
            .native_events
            .iter()
            .map(String::as_str)
            .chain(mapped);
        for event in candidates {
            if !resolved.iter().any(|existing| existing == event) {
                resolved.push(event.to_string());
            }
        }
        resolved
    }
}

// ---------------------------------------------------------------------------
// Commit statuses
// ---------------------------------------------------------------------------

/// Provider-independent commit status state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// The vendor reported a state with no known mapping.
    #[default]
    Unknown,
    /// Queued, not yet started.
    Pending,
    /// Started, not finished. Most providers collapse this onto pending.
    Running,
    /// Finished successfully.
    Success,
    /// Finished with a failing result.
    Failure,
    /// Could not finish.
    Error,
}

impl State {
    /// Every state, in declaration order.
    pub const ALL: [State; 6] = [
        State::Unknown,
        State::Pending,
        State::Running,
        State::Success,
        State::Failure,
        State::Error,
    ];
}

/// A named judgment attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Current state.
    pub state: State,
    /// Context name (GitHub) or build key (Stash).
    pub label: String,
    /// Short description.
    pub desc: String,
    /// Link to the build or check output.
    pub target: String,
}

/// Input for creating a commit status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInput {
    /// State to report.
    pub state: State,
    /// Context name or build key.
    pub label: String,
    /// Short description.
    pub desc: String,
    /// Link to the build or check output.
    pub target: String,
}

/// All statuses for one commit plus the provider's rolled-up state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// Commit SHA the statuses belong to.
    pub sha: String,
    /// Rolled-up state.
    pub state: State,
    /// Latest status per context.
    pub statuses: Vec<Status>,
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
