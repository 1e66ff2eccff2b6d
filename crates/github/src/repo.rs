//! Repository, webhook and commit-status operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use scm::transport::unexpected_status;
use scm::{
    CombinedStatus, Context, EventTable, Hook, HookEventKind, HookId, HookInput, Label,
    ListOptions, Perm, Reply, RepoId, Repository, RepositoryService, Request, Response, ScmError,
    State, Status, StatusInput, Timestamp, User,
};

use crate::user::{convert_labels, convert_users, WireLabel, WireUser};
use crate::{list_query, paged, GithubClient};

/// Accept header enabling nested-team collaborator resolution.
const COLLABORATOR_ACCEPT: &str = "application/vnd.github.hellcat-preview+json";

// ---------------------------------------------------------------------------
// Wire structs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireRepository {
    id: u64,
    owner: WireOwner,
    name: String,
    full_name: String,
    private: bool,
    html_url: String,
    ssh_url: String,
    clone_url: String,
    default_branch: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    permissions: Option<WirePermissions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireOwner {
    login: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePermissions {
    admin: bool,
    push: bool,
    pull: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireHook {
    #[serde(skip_serializing_if = "is_zero")]
    id: u64,
    name: String,
    events: Vec<String>,
    active: bool,
    config: WireHookConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireHookConfig {
    url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    secret: String,
    content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    insecure_ssl: Option<serde_json::Value>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireCombinedStatus {
    sha: String,
    statuses: Vec<WireStatus>,
    state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireStatus {
    state: String,
    target_url: Option<String>,
    description: Option<String>,
    context: String,
}

#[derive(Debug, Serialize)]
struct WireStatusInput {
    state: &'static str,
    context: String,
    description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    target_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireUserPermission {
    permission: String,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[async_trait]
impl RepositoryService for GithubClient {
    #[instrument(level = "debug", skip(self, ctx))]
    async fn find(&self, ctx: &Context, repo: &str) -> Reply<Repository> {
        let (out, res) = self
            .api
            .fetch::<WireRepository>(ctx, Request::get(format!("repos/{repo}")))
            .await?;
        Ok((convert_repository(out), res))
    }

    async fn find_hook(&self, ctx: &Context, repo: &str, id: &str) -> Reply<Hook> {
        let (out, res) = self
            .api
            .fetch::<WireHook>(ctx, Request::get(format!("repos/{repo}/hooks/{id}")))
            .await?;
        Ok((convert_hook(out), res))
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn find_perms(&self, ctx: &Context, repo: &str) -> Reply<Perm> {
        let (out, res) = self
            .api
            .fetch::<WireRepository>(ctx, Request::get(format!("repos/{repo}")))
            .await?;
        Ok((convert_repository(out).perm.unwrap_or(Perm::NONE), res))
    }

    async fn find_user_permission(&self, ctx: &Context, repo: &str, user: &str) -> Reply<String> {
        let path = format!("repos/{repo}/collaborators/{user}/permission");
        let (out, res) = self
            .api
            .fetch::<WireUserPermission>(ctx, Request::get(path))
            .await?;
        Ok((out.permission, res))
    }

    /// GitHub answers `204` for collaborators and `404` for everyone else.
    async fn is_collaborator(&self, ctx: &Context, repo: &str, user: &str) -> Reply<bool> {
        let path = format!("repos/{repo}/collaborators/{user}");
        let request = Request::get(path.clone()).header("Accept", COLLABORATOR_ACCEPT);
        let raw = self.api.probe(ctx, request).await?;
        match raw.status {
            204 => Ok((true, Response::from_raw(raw))),
            404 => Ok((false, Response::from_raw(raw))),
            status => Err(unexpected_status(scm::Method::Get, &path, &raw, status)),
        }
    }

    /// Returns the first page of collaborators only. The operation takes no
    /// list options, so no page cursor is attached.
    async fn list_collaborators(&self, ctx: &Context, repo: &str) -> Reply<Vec<User>> {
        let request = Request::get(format!("repos/{repo}/collaborators"))
            .header("Accept", COLLABORATOR_ACCEPT);
        let (out, res) = self.api.fetch::<Vec<WireUser>>(ctx, request).await?;
        Ok((convert_users(out), res))
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn list(&self, ctx: &Context, opts: ListOptions) -> Reply<Vec<Repository>> {
        let request = Request::get("user/repos").query_pairs(list_query(&opts));
        let (out, res) = self.api.fetch::<Vec<WireRepository>>(ctx, request).await?;
        let res = paged(&opts, res, out.len());
        Ok((out.into_iter().map(convert_repository).collect(), res))
    }

    async fn list_hooks(&self, ctx: &Context, repo: &str, opts: ListOptions) -> Reply<Vec<Hook>> {
        let request = Request::get(format!("repos/{repo}/hooks")).query_pairs(list_query(&opts));
        let (out, res) = self.api.fetch::<Vec<WireHook>>(ctx, request).await?;
        let res = paged(&opts, res, out.len());
        Ok((out.into_iter().map(convert_hook).collect(), res))
    }

    async fn list_status(
        &self,
        ctx: &Context,
        repo: &str,
        reference: &str,
        opts: ListOptions,
    ) -> Reply<Vec<Status>> {
        let request = Request::get(format!("repos/{repo}/statuses/{reference}"))
            .query_pairs(list_query(&opts));
        let (out, res) = self.api.fetch::<Vec<WireStatus>>(ctx, request).await?;
        let res = paged(&opts, res, out.len());
        Ok((out.into_iter().map(convert_status).collect(), res))
    }

    async fn find_combined_status(
        &self,
        ctx: &Context,
        repo: &str,
        reference: &str,
    ) -> Reply<CombinedStatus> {
        let path = format!("repos/{repo}/commits/{reference}/status");
        let (out, res) = self
            .api
            .fetch::<WireCombinedStatus>(ctx, Request::get(path))
            .await?;
        Ok((convert_combined_status(out), res))
    }

    async fn list_labels(&self, ctx: &Context, repo: &str, opts: ListOptions) -> Reply<Vec<Label>> {
        let request = Request::get(format!("repos/{repo}/labels")).query_pairs(list_query(&opts));
        let (out, res) = self.api.fetch::<Vec<WireLabel>>(ctx, request).await?;
        let res = paged(&opts, res, out.len());
        Ok((convert_labels(out), res))
    }

    #[instrument(level = "debug", skip(self, ctx, input), fields(target = %input.target))]
    async fn create_hook(&self, ctx: &Context, repo: &str, input: &HookInput) -> Reply<Hook> {
        let request = Request::post(format!("repos/{repo}/hooks")).json(&hook_input(input))?;
        let (out, res) = self.api.fetch::<WireHook>(ctx, request).await?;
        Ok((convert_hook(out), res))
    }

    #[instrument(level = "debug", skip(self, ctx, input), fields(state = ?input.state))]
    async fn create_status(
        &self,
        ctx: &Context,
        repo: &str,
        reference: &str,
        input: &StatusInput,
    ) -> Reply<Status> {
        let body = WireStatusInput {
            state: convert_from_state(input.state),
            context: input.label.clone(),
            description: input.desc.clone(),
            target_url: input.target.clone(),
        };
        let request = Request::post(format!("repos/{repo}/statuses/{reference}")).json(&body)?;
        let (out, res) = self.api.fetch::<WireStatus>(ctx, request).await?;
        Ok((convert_status(out), res))
    }

    async fn delete_hook(&self, ctx: &Context, repo: &str, id: &str) -> Result<Response, ScmError> {
        self.api
            .execute(ctx, Request::delete(format!("repos/{repo}/hooks/{id}")))
            .await
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn convert_repository(from: WireRepository) -> Repository {
    Repository {
        id: RepoId::from(from.id),
        namespace: from.owner.login,
        name: from.name,
        full_name: from.full_name,
        private: from.private,
        link: from.html_url,
        clone: from.clone_url,
        clone_ssh: from.ssh_url,
        branch: from.default_branch.unwrap_or_default(),
        perm: from.permissions.map(|p| Perm {
            pull: p.pull,
            push: p.push,
            admin: p.admin,
        }),
        created: from.created_at.map(Timestamp::from_utc),
        updated: from.updated_at.map(Timestamp::from_utc),
    }
}

fn convert_hook(from: WireHook) -> Hook {
    Hook {
        id: HookId::from(from.id),
        name: from.name,
        active: from.active,
        target: from.config.url,
        events: from.events,
    }
}

/// GitHub hooks are always named `web` and deliver JSON.
fn hook_input(input: &HookInput) -> WireHook {
    WireHook {
        id: 0,
        name: "web".to_string(),
        events: input.resolve_events(EVENT_TABLE),
        active: true,
        config: WireHookConfig {
            url: input.target.clone(),
            secret: input.secret.clone(),
            content_type: "json".to_string(),
            insecure_ssl: input.skip_verify.then(|| serde_json::Value::from("1")),
        },
    }
}

/// GitHub webhook event names and the shared flags that select them.
pub const EVENT_TABLE: EventTable = &[
    ("push", &[HookEventKind::Push]),
    ("pull_request", &[HookEventKind::PullRequest]),
    ("pull_request_review_comment", &[HookEventKind::PullRequestComment]),
    ("issues", &[HookEventKind::Issue]),
    (
        "issue_comment",
        &[HookEventKind::IssueComment, HookEventKind::PullRequestComment],
    ),
    ("create", &[HookEventKind::Branch, HookEventKind::Tag]),
    ("delete", &[HookEventKind::Branch, HookEventKind::Tag]),
];

fn convert_combined_status(from: WireCombinedStatus) -> CombinedStatus {
    CombinedStatus {
        sha: from.sha,
        state: convert_state(&from.state),
        statuses: from.statuses.into_iter().map(convert_status).collect(),
    }
}

fn convert_status(from: WireStatus) -> Status {
    Status {
        state: convert_state(&from.state),
        label: from.context,
        desc: from.description.unwrap_or_default(),
        target: from.target_url.unwrap_or_default(),
    }
}

/// Reads a GitHub status state. Unrecognised values decode to
/// [`State::Unknown`].
pub fn convert_state(from: &str) -> State {
    match from {
        "error" => State::Error,
        "failure" => State::Failure,
        "pending" => State::Pending,
        "success" => State::Success,
        other => {
            debug!(state = other, "unmapped github status state");
            State::Unknown
        }
    }
}

/// Writes a GitHub status state.
///
/// GitHub has no "running" state: [`State::Running`] collapses to `pending`.
/// [`State::Unknown`] is reported as `error`.
pub fn convert_from_state(from: State) -> &'static str {
    match from {
        State::Pending | State::Running => "pending",
        State::Success => "success",
        State::Failure => "failure",
        State::Unknown | State::Error => "error",
    }
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
