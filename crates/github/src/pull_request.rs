//! Pull request operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use scm::{
    Comment, CommentInput, Context, ListOptions, PullRequest, PullRequestListOptions,
    PullRequestService, Reply, Request, Response, ScmError, Timestamp,
};

use crate::issue::{create_issue_comment, list_issue_comments, state_filter, WireStateInput};
use crate::user::{convert_user, WireUser};
use crate::{list_query, paged, GithubClient};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePullRequest {
    number: u64,
    state: String,
    title: String,
    body: Option<String>,
    html_url: String,
    user: WireUser,
    head: WireBranch,
    base: WireBranch,
    merged: bool,
    merged_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireBranch {
    #[serde(rename = "ref")]
    reference: String,
    sha: String,
}

#[async_trait]
impl PullRequestService for GithubClient {
    async fn find(&self, ctx: &Context, repo: &str, number: u64) -> Reply<PullRequest> {
        let path = format!("repos/{repo}/pulls/{number}");
        let (out, res) = self
            .api
            .fetch::<WirePullRequest>(ctx, Request::get(path))
            .await?;
        Ok((convert_pull_request(out), res))
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn list(
        &self,
        ctx: &Context,
        repo: &str,
        opts: PullRequestListOptions,
    ) -> Reply<Vec<PullRequest>> {
        let list = opts.list_options();
        let request = Request::get(format!("repos/{repo}/pulls"))
            .query_pairs(list_query(&list))
            .query("state", state_filter(opts.open, opts.closed));
        let (out, res) = self.api.fetch::<Vec<WirePullRequest>>(ctx, request).await?;
        let res = paged(&list, res, out.len());
        Ok((out.into_iter().map(convert_pull_request).collect(), res))
    }

    async fn list_comments(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        opts: ListOptions,
    ) -> Reply<Vec<Comment>> {
        list_issue_comments(self, ctx, repo, number, opts).await
    }

    async fn create_comment(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        input: &CommentInput,
    ) -> Reply<Comment> {
        create_issue_comment(self, ctx, repo, number, input).await
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn merge(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError> {
        let path = format!("repos/{repo}/pulls/{number}/merge");
        self.api.execute(ctx, Request::put(path)).await
    }

    async fn close(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError> {
        let request = Request::patch(format!("repos/{repo}/pulls/{number}"))
            .json(&WireStateInput { state: "closed" })?;
        self.api.execute(ctx, request).await
    }
}

fn convert_pull_request(from: WirePullRequest) -> PullRequest {
    PullRequest {
        number: from.number,
        title: from.title,
        body: from.body.unwrap_or_default(),
        sha: from.head.sha,
        source: from.head.reference,
        target: from.base.reference,
        link: from.html_url,
        closed: from.state == "closed",
        merged: from.merged || from.merged_at.is_some(),
        author: convert_user(from.user),
        created: from.created_at.map(Timestamp::from_utc),
        updated: from.updated_at.map(Timestamp::from_utc),
    }
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;
