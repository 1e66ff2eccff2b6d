//! Issue, issue comment, label and assignee operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use scm::{
    Comment, CommentInput, Context, Issue, IssueInput, IssueListOptions, IssueService,
    ListOptions, ListedIssueEvent, Reply, Request, Response, ScmError, Timestamp,
};

use crate::user::{convert_label, convert_labels, convert_user, convert_users, WireLabel, WireUser};
use crate::{encode_segment, list_query, paged, GithubClient};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireIssue {
    number: u64,
    state: String,
    title: String,
    body: Option<String>,
    html_url: String,
    user: WireUser,
    labels: Vec<WireLabel>,
    assignees: Vec<WireUser>,
    locked: bool,
    pull_request: Option<serde_json::Value>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireComment {
    id: u64,
    html_url: String,
    user: WireUser,
    body: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireIssueEvent {
    event: String,
    actor: WireUser,
    label: Option<WireLabel>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct WireIssueInput<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireCommentInput<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireStateInput {
    pub state: &'static str,
}

#[derive(Debug, Serialize)]
struct WireLabelsInput<'a> {
    labels: [&'a str; 1],
}

#[derive(Debug, Serialize)]
struct WireAssigneesInput<'a> {
    assignees: &'a [String],
}

#[async_trait]
impl IssueService for GithubClient {
    async fn find(&self, ctx: &Context, repo: &str, number: u64) -> Reply<Issue> {
        let path = format!("repos/{repo}/issues/{number}");
        let (out, res) = self.api.fetch::<WireIssue>(ctx, Request::get(path)).await?;
        Ok((convert_issue(out), res))
    }

    /// GitHub addresses issue comments by id alone; `number` is not part of
    /// the path.
    async fn find_comment(&self, ctx: &Context, repo: &str, _number: u64, id: u64) -> Reply<Comment> {
        let path = format!("repos/{repo}/issues/comments/{id}");
        let (out, res) = self.api.fetch::<WireComment>(ctx, Request::get(path)).await?;
        Ok((convert_comment(out), res))
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn list(&self, ctx: &Context, repo: &str, opts: IssueListOptions) -> Reply<Vec<Issue>> {
        let list = opts.list_options();
        let request = Request::get(format!("repos/{repo}/issues"))
            .query_pairs(list_query(&list))
            .query("state", state_filter(opts.open, opts.closed));
        let (out, res) = self.api.fetch::<Vec<WireIssue>>(ctx, request).await?;
        let res = paged(&list, res, out.len());
        Ok((out.into_iter().map(convert_issue).collect(), res))
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

    async fn list_labels(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        opts: ListOptions,
    ) -> Reply<Vec<scm::Label>> {
        let request = Request::get(format!("repos/{repo}/issues/{number}/labels"))
            .query_pairs(list_query(&opts));
        let (out, res) = self.api.fetch::<Vec<WireLabel>>(ctx, request).await?;
        let res = paged(&opts, res, out.len());
        Ok((convert_labels(out), res))
    }

    async fn list_events(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        opts: ListOptions,
    ) -> Reply<Vec<ListedIssueEvent>> {
        let request = Request::get(format!("repos/{repo}/issues/{number}/events"))
            .query_pairs(list_query(&opts));
        let (out, res) = self.api.fetch::<Vec<WireIssueEvent>>(ctx, request).await?;
        let res = paged(&opts, res, out.len());
        Ok((out.into_iter().map(convert_issue_event).collect(), res))
    }

    #[instrument(level = "debug", skip(self, ctx, input))]
    async fn create(&self, ctx: &Context, repo: &str, input: &IssueInput) -> Reply<Issue> {
        let body = WireIssueInput {
            title: &input.title,
            body: &input.body,
        };
        let request = Request::post(format!("repos/{repo}/issues")).json(&body)?;
        let (out, res) = self.api.fetch::<WireIssue>(ctx, request).await?;
        Ok((convert_issue(out), res))
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

    async fn delete_comment(
        &self,
        ctx: &Context,
        repo: &str,
        _number: u64,
        id: u64,
    ) -> Result<Response, ScmError> {
        let path = format!("repos/{repo}/issues/comments/{id}");
        self.api.execute(ctx, Request::delete(path)).await
    }

    async fn close(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError> {
        let request = Request::patch(format!("repos/{repo}/issues/{number}"))
            .json(&WireStateInput { state: "closed" })?;
        self.api.execute(ctx, request).await
    }

    async fn lock(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError> {
        let path = format!("repos/{repo}/issues/{number}/lock");
        self.api.execute(ctx, Request::put(path)).await
    }

    async fn unlock(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError> {
        let path = format!("repos/{repo}/issues/{number}/lock");
        self.api.execute(ctx, Request::delete(path)).await
    }

    async fn add_label(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<Response, ScmError> {
        let request = Request::post(format!("repos/{repo}/issues/{number}/labels"))
            .json(&WireLabelsInput { labels: [label] })?;
        self.api.execute(ctx, request).await
    }

    async fn delete_label(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<Response, ScmError> {
        let path = format!(
            "repos/{repo}/issues/{number}/labels/{}",
            encode_segment(label)
        );
        self.api.execute(ctx, Request::delete(path)).await
    }

    async fn assign_issue(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        logins: &[String],
    ) -> Result<Response, ScmError> {
        let request = Request::post(format!("repos/{repo}/issues/{number}/assignees"))
            .json(&WireAssigneesInput { assignees: logins })?;
        self.api.execute(ctx, request).await
    }

    async fn unassign_issue(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        logins: &[String],
    ) -> Result<Response, ScmError> {
        let request = Request::delete(format!("repos/{repo}/issues/{number}/assignees"))
            .json(&WireAssigneesInput { assignees: logins })?;
        self.api.execute(ctx, request).await
    }
}

// Pull request conversations are issue comments on GitHub, so both services
// share these.

pub(crate) async fn list_issue_comments(
    client: &GithubClient,
    ctx: &Context,
    repo: &str,
    number: u64,
    opts: ListOptions,
) -> Reply<Vec<Comment>> {
    let request = Request::get(format!("repos/{repo}/issues/{number}/comments"))
        .query_pairs(list_query(&opts));
    let (out, res) = client.api.fetch::<Vec<WireComment>>(ctx, request).await?;
    let res = paged(&opts, res, out.len());
    Ok((out.into_iter().map(convert_comment).collect(), res))
}

pub(crate) async fn create_issue_comment(
    client: &GithubClient,
    ctx: &Context,
    repo: &str,
    number: u64,
    input: &CommentInput,
) -> Reply<Comment> {
    let request = Request::post(format!("repos/{repo}/issues/{number}/comments"))
        .json(&WireCommentInput { body: &input.body })?;
    let (out, res) = client.api.fetch::<WireComment>(ctx, request).await?;
    Ok((convert_comment(out), res))
}

/// Maps the open/closed selection onto GitHub's `state` filter.
pub(crate) fn state_filter(open: bool, closed: bool) -> &'static str {
    match (open, closed) {
        (true, false) => "open",
        (false, true) => "closed",
        _ => "all",
    }
}

fn convert_issue(from: WireIssue) -> Issue {
    Issue {
        number: from.number,
        closed: from.state == "closed",
        state: from.state,
        title: from.title,
        body: from.body.unwrap_or_default(),
        link: from.html_url,
        labels: from.labels.into_iter().map(|label| label.name).collect(),
        locked: from.locked,
        author: convert_user(from.user),
        assignees: convert_users(from.assignees),
        pull_request: from.pull_request.is_some(),
        created: from.created_at.map(Timestamp::from_utc),
        updated: from.updated_at.map(Timestamp::from_utc),
    }
}

pub(crate) fn convert_comment(from: WireComment) -> Comment {
    Comment {
        id: from.id,
        body: from.body,
        author: convert_user(from.user),
        link: from.html_url,
        created: from.created_at.map(Timestamp::from_utc),
        updated: from.updated_at.map(Timestamp::from_utc),
    }
}

fn convert_issue_event(from: WireIssueEvent) -> ListedIssueEvent {
    ListedIssueEvent {
        event: from.event,
        actor: convert_user(from.actor),
        label: from.label.map(convert_label).unwrap_or_default(),
        created: from.created_at.map(Timestamp::from_utc),
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
