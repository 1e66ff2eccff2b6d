//! Repository, webhook and build-status operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use scm::{
    join, split, CombinedStatus, Context, Driver, EventTable, Hook, HookEventKind, HookId,
    HookInput, Label, ListOptions, Perm, Reply, RepoId, Repository, RepositoryService, Request,
    Response, ScmError, State, Status, StatusInput, User,
};

use crate::user::{convert_user, WireUser};
use crate::{list_query, list_role_query, paged, perms, repo_path, StashClient, WirePage};

/// Page size used for collaborator and writable-repository lookups.
const LOOKUP_LIMIT: u32 = 1000;

// ---------------------------------------------------------------------------
// Wire structs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireRepository {
    id: u64,
    pub slug: String,
    project: WireProject,
    public: bool,
    links: WireRepositoryLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireProject {
    key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireRepositoryLinks {
    clone: Vec<WireLink>,
    #[serde(rename = "self")]
    self_links: Vec<WireLink>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireLink {
    href: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireHook {
    id: u64,
    name: String,
    events: Vec<String>,
    url: String,
    active: bool,
}

#[derive(Debug, Serialize)]
struct WireHookInput {
    name: String,
    events: Vec<String>,
    url: String,
    active: bool,
    configuration: WireHookConfig,
}

#[derive(Debug, Serialize)]
struct WireHookConfig {
    secret: String,
}

#[derive(Debug, Serialize)]
struct WireStatusInput<'a> {
    state: &'static str,
    key: &'a str,
    name: &'a str,
    url: &'a str,
    description: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireParticipant {
    user: WireUser,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[async_trait]
impl RepositoryService for StashClient {
    #[instrument(level = "debug", skip(self, ctx))]
    async fn find(&self, ctx: &Context, repo: &str) -> Reply<Repository> {
        let (out, res) = self
            .api
            .fetch::<WireRepository>(ctx, Request::get(repo_path(repo)))
            .await?;
        Ok((convert_repository(out), res))
    }

    async fn find_hook(&self, ctx: &Context, repo: &str, id: &str) -> Reply<Hook> {
        let path = format!("{}/webhooks/{id}", repo_path(repo));
        let (out, res) = self.api.fetch::<WireHook>(ctx, Request::get(path)).await?;
        Ok((convert_hook(out), res))
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn find_perms(&self, ctx: &Context, repo: &str) -> Reply<Perm> {
        perms::resolve(self, ctx, repo).await
    }

    async fn find_user_permission(&self, _: &Context, _: &str, _: &str) -> Reply<String> {
        Err(ScmError::not_supported(Driver::Stash, "find_user_permission"))
    }

    /// Scans the repository's user permission grants for `user`, matching
    /// either the account name or the slug.
    async fn is_collaborator(&self, ctx: &Context, repo: &str, user: &str) -> Reply<bool> {
        let (out, res) = self.participants(ctx, repo).await?;
        let found = out
            .iter()
            .any(|participant| participant.user.name == user || participant.user.slug == user);
        Ok((found, res))
    }

    async fn list_collaborators(&self, ctx: &Context, repo: &str) -> Reply<Vec<User>> {
        let (out, res) = self.participants(ctx, repo).await?;
        Ok((
            out.into_iter().map(|p| convert_user(p.user)).collect(),
            res,
        ))
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn list(&self, ctx: &Context, opts: ListOptions) -> Reply<Vec<Repository>> {
        let request = Request::get("rest/api/1.0/repos").query_pairs(list_role_query(&opts));
        let (out, res) = self
            .api
            .fetch::<WirePage<WireRepository>>(ctx, request)
            .await?;
        let res = paged(&opts, res, out.is_last_page, out.values.len());
        Ok((out.values.into_iter().map(convert_repository).collect(), res))
    }

    async fn list_hooks(&self, ctx: &Context, repo: &str, opts: ListOptions) -> Reply<Vec<Hook>> {
        let request =
            Request::get(format!("{}/webhooks", repo_path(repo))).query_pairs(list_query(&opts));
        let (out, res) = self.api.fetch::<WirePage<WireHook>>(ctx, request).await?;
        let res = paged(&opts, res, out.is_last_page, out.values.len());
        Ok((out.values.into_iter().map(convert_hook).collect(), res))
    }

    async fn list_status(
        &self,
        _: &Context,
        _: &str,
        _: &str,
        _: ListOptions,
    ) -> Reply<Vec<Status>> {
        Err(ScmError::not_supported(Driver::Stash, "list_status"))
    }

    async fn find_combined_status(&self, _: &Context, _: &str, _: &str) -> Reply<CombinedStatus> {
        Err(ScmError::not_supported(Driver::Stash, "find_combined_status"))
    }

    async fn list_labels(&self, _: &Context, _: &str, _: ListOptions) -> Reply<Vec<Label>> {
        Err(ScmError::not_supported(Driver::Stash, "list_labels"))
    }

    #[instrument(level = "debug", skip(self, ctx, input), fields(target = %input.target))]
    async fn create_hook(&self, ctx: &Context, repo: &str, input: &HookInput) -> Reply<Hook> {
        let request =
            Request::post(format!("{}/webhooks", repo_path(repo))).json(&hook_input(input))?;
        let (out, res) = self.api.fetch::<WireHook>(ctx, request).await?;
        Ok((convert_hook(out), res))
    }

    /// Build statuses are keyed by commit only. Stash answers with an empty
    /// body, so the returned status echoes the input.
    #[instrument(level = "debug", skip(self, ctx, input), fields(state = ?input.state))]
    async fn create_status(
        &self,
        ctx: &Context,
        _repo: &str,
        reference: &str,
        input: &StatusInput,
    ) -> Reply<Status> {
        let body = WireStatusInput {
            state: convert_from_state(input.state),
            key: &input.label,
            name: &input.label,
            url: &input.target,
            description: &input.desc,
        };
        let request =
            Request::post(format!("rest/build-status/1.0/commits/{reference}")).json(&body)?;
        let res = self.api.execute(ctx, request).await?;
        let status = Status {
            state: input.state,
            label: input.label.clone(),
            desc: input.desc.clone(),
            target: input.target.clone(),
        };
        Ok((status, res))
    }

    async fn delete_hook(&self, ctx: &Context, repo: &str, id: &str) -> Result<Response, ScmError> {
        let path = format!("{}/webhooks/{id}", repo_path(repo));
        self.api.execute(ctx, Request::delete(path)).await
    }
}

impl StashClient {
    async fn participants(&self, ctx: &Context, repo: &str) -> Reply<Vec<WireParticipant>> {
        let opts = ListOptions::new(0, LOOKUP_LIMIT);
        let request = Request::get(format!("{}/permissions/users", repo_path(repo)))
            .query_pairs(list_query(&opts));
        let (out, res) = self
            .api
            .fetch::<WirePage<WireParticipant>>(ctx, request)
            .await?;
        let res = paged(&opts, res, out.is_last_page, out.values.len());
        Ok((out.values, res))
    }

    /// Repositories matching `repo` that the caller may push to.
    pub(crate) async fn list_writable(
        &self,
        ctx: &Context,
        repo: &str,
    ) -> Reply<Vec<WireRepository>> {
        let (namespace, name) = split(repo);
        let request = Request::get("rest/api/1.0/repos")
            .query("limit", LOOKUP_LIMIT)
            .query("permission", "REPO_WRITE")
            .query("project", namespace)
            .query("name", name);
        let (out, res) = self
            .api
            .fetch::<WirePage<WireRepository>>(ctx, request)
            .await?;
        Ok((out.values, res))
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Stash does not report the default branch in repository payloads; `master`
/// is assumed.
fn convert_repository(from: WireRepository) -> Repository {
    let clone = extract_link(&from.links.clone, "http");
    let clone_ssh = extract_link(&from.links.clone, "ssh");
    Repository {
        id: RepoId::from(from.id),
        full_name: join(&from.project.key, &from.slug),
        namespace: from.project.key,
        name: from.slug,
        private: !from.public,
        link: from
            .links
            .self_links
            .first()
            .map(|link| link.href.clone())
            .unwrap_or_default(),
        clone: anonymize_link(&clone),
        clone_ssh,
        branch: "master".to_string(),
        perm: None,
        created: None,
        updated: None,
    }
}

fn extract_link(links: &[WireLink], name: &str) -> String {
    links
        .iter()
        .find(|link| link.name == name)
        .map(|link| link.href.clone())
        .unwrap_or_default()
}

/// Strips embedded credentials (`https://user@host/...`) from a clone URL.
/// Unparseable input is returned unchanged.
fn anonymize_link(link: &str) -> String {
    match url::Url::parse(link) {
        Ok(mut parsed) => {
            // Both setters only fail for URLs that cannot carry credentials.
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        Err(_) => link.to_string(),
    }
}

fn hook_input(input: &HookInput) -> WireHookInput {
    WireHookInput {
        name: input.name.clone(),
        events: input.resolve_events(EVENT_TABLE),
        url: input.target.clone(),
        active: true,
        configuration: WireHookConfig {
            secret: input.secret.clone(),
        },
    }
}

fn convert_hook(from: WireHook) -> Hook {
    Hook {
        id: HookId::from(from.id),
        name: from.name,
        active: from.active,
        target: from.url,
        events: from.events,
    }
}

/// Stash webhook event names and the shared flags that select them.
///
/// Branch and tag changes arrive as `repo:refs_changed`; issues have no
/// equivalent.
pub const EVENT_TABLE: EventTable = &[
    (
        "repo:refs_changed",
        &[HookEventKind::Push, HookEventKind::Branch, HookEventKind::Tag],
    ),
    ("pr:declined", &[HookEventKind::PullRequest]),
    ("pr:modified", &[HookEventKind::PullRequest]),
    ("pr:deleted", &[HookEventKind::PullRequest]),
    ("pr:opened", &[HookEventKind::PullRequest]),
    ("pr:merged", &[HookEventKind::PullRequest]),
    ("pr:comment:added", &[HookEventKind::PullRequestComment]),
    ("pr:comment:deleted", &[HookEventKind::PullRequestComment]),
    ("pr:comment:edited", &[HookEventKind::PullRequestComment]),
];

/// Reads a Stash build state.
pub fn convert_state(from: &str) -> State {
    match from {
        "FAILED" => State::Failure,
        "INPROGRESS" => State::Pending,
        "SUCCESSFUL" => State::Success,
        other => {
            debug!(state = other, "unmapped stash build state");
            State::Unknown
        }
    }
}

/// Writes a Stash build state.
///
/// Stash knows three states: [`State::Running`] collapses to `INPROGRESS`,
/// and [`State::Unknown`] and [`State::Error`] are reported as `FAILED`.
pub fn convert_from_state(from: State) -> &'static str {
    match from {
        State::Pending | State::Running => "INPROGRESS",
        State::Success => "SUCCESSFUL",
        State::Unknown | State::Failure | State::Error => "FAILED",
    }
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
