//! Pull request operations.
//!
//! Merge and decline are guarded by optimistic locking: Stash rejects them
//! unless the current pull request `version` is supplied, so both fetch the
//! pull request first.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use scm::{
    Comment, CommentInput, Context, ListOptions, PullRequest, PullRequestListOptions,
    PullRequestService, Reply, Request, Response, ScmError, Timestamp,
};

use crate::user::{convert_user, WireUser};
use crate::{list_query, paged, repo_path, StashClient, WirePage};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WirePullRequest {
    id: u64,
    version: u64,
    title: String,
    description: Option<String>,
    state: String,
    closed: bool,
    created_date: i64,
    updated_date: i64,
    from_ref: WireRef,
    to_ref: WireRef,
    author: WireParticipant,
    links: WireLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireRef {
    display_id: String,
    latest_commit: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireParticipant {
    user: WireUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireLinks {
    #[serde(rename = "self")]
    self_links: Vec<WireHref>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireHref {
    href: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct WireComment {
    id: u64,
    text: String,
    author: WireUser,
    created_date: i64,
    updated_date: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireCommentInput<'a> {
    pub text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireActivity {
    action: String,
    comment: Option<WireComment>,
}

#[async_trait]
impl PullRequestService for StashClient {
    async fn find(&self, ctx: &Context, repo: &str, number: u64) -> Reply<PullRequest> {
        let (out, res) = self.fetch_pull_request(ctx, repo, number).await?;
        Ok((convert_pull_request(out), res))
    }

    /// Stash filters on one state at a time, so a closed-only listing asks
    /// for every state and drops the open entries. Paging follows the
    /// unfiltered page.
    #[instrument(level = "debug", skip(self, ctx))]
    async fn list(
        &self,
        ctx: &Context,
        repo: &str,
        opts: PullRequestListOptions,
    ) -> Reply<Vec<PullRequest>> {
        let list = opts.list_options();
        let state = if opts.open && !opts.closed { "OPEN" } else { "ALL" };
        let request = Request::get(format!("{}/pull-requests", repo_path(repo)))
            .query_pairs(list_query(&list))
            .query("state", state);
        let (out, res) = self
            .api
            .fetch::<WirePage<WirePullRequest>>(ctx, request)
            .await?;
        let res = paged(&list, res, out.is_last_page, out.values.len());
        let closed_only = opts.closed && !opts.open;
        let prs = out
            .values
            .into_iter()
            .map(convert_pull_request)
            .filter(|pr| !closed_only || pr.closed)
            .collect();
        Ok((prs, res))
    }

    /// Comments are read from the activity stream.
    async fn list_comments(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        opts: ListOptions,
    ) -> Reply<Vec<Comment>> {
        let request = Request::get(format!(
            "{}/pull-requests/{number}/activities",
            repo_path(repo)
        ))
        .query_pairs(list_query(&opts));
        let (out, res) = self
            .api
            .fetch::<WirePage<WireActivity>>(ctx, request)
            .await?;
        let res = paged(&opts, res, out.is_last_page, out.values.len());
        let comments = out
            .values
            .into_iter()
            .filter(|activity| activity.action == "COMMENTED")
            .filter_map(|activity| activity.comment)
            .map(convert_comment)
            .collect();
        Ok((comments, res))
    }

    async fn create_comment(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        input: &CommentInput,
    ) -> Reply<Comment> {
        let request = Request::post(format!(
            "{}/pull-requests/{number}/comments",
            repo_path(repo)
        ))
        .json(&WireCommentInput { text: &input.body })?;
        let (out, res) = self.api.fetch::<WireComment>(ctx, request).await?;
        Ok((convert_comment(out), res))
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn merge(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError> {
        self.transition(ctx, repo, number, "merge").await
    }

    async fn close(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError> {
        self.transition(ctx, repo, number, "decline").await
    }
}

impl StashClient {
    async fn fetch_pull_request(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
    ) -> Reply<WirePullRequest> {
        let path = format!("{}/pull-requests/{number}", repo_path(repo));
        self.api.fetch::<WirePullRequest>(ctx, Request::get(path)).await
    }

    async fn transition(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        action: &str,
    ) -> Result<Response, ScmError> {
        let (current, _) = self.fetch_pull_request(ctx, repo, number).await?;
        let request = Request::post(format!(
            "{}/pull-requests/{number}/{action}",
            repo_path(repo)
        ))
        .query("version", current.version);
        self.api.execute(ctx, request).await
    }
}

fn convert_pull_request(from: WirePullRequest) -> PullRequest {
    PullRequest {
        number: from.id,
        title: from.title,
        body: from.description.unwrap_or_default(),
        sha: from.from_ref.latest_commit,
        source: from.from_ref.display_id,
        target: from.to_ref.display_id,
        link: from
            .links
            .self_links
            .into_iter()
            .next()
            .map(|link| link.href)
            .unwrap_or_default(),
        closed: from.closed,
        merged: from.state == "MERGED",
        author: convert_user(from.author.user),
        created: Timestamp::from_millis(from.created_date),
        updated: Timestamp::from_millis(from.updated_date),
    }
}

/// Stash comments carry no web link of their own.
pub(crate) fn convert_comment(from: WireComment) -> Comment {
    Comment {
        id: from.id,
        body: from.text,
        author: convert_user(from.author),
        link: String::new(),
        created: Timestamp::from_millis(from.created_date),
        updated: Timestamp::from_millis(from.updated_date),
    }
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;
