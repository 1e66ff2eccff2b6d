//! Issue operations.
//!
//! Stash has no issue tracker. Only commenting is forwarded; the rest
//! reports [`ScmError::NotSupported`].

use async_trait::async_trait;

use scm::{
    Comment, CommentInput, Context, Driver, Issue, IssueInput, IssueListOptions, IssueService,
    Label, ListOptions, ListedIssueEvent, Reply, Request, Response, ScmError,
};

use crate::pull_request::{convert_comment, WireComment, WireCommentInput};
use crate::{repo_path, StashClient};

fn unsupported(operation: &'static str) -> ScmError {
    ScmError::not_supported(Driver::Stash, operation)
}

#[async_trait]
impl IssueService for StashClient {
    async fn find(&self, _: &Context, _: &str, _: u64) -> Reply<Issue> {
        Err(unsupported("find_issue"))
    }

    async fn find_comment(&self, _: &Context, _: &str, _: u64, _: u64) -> Reply<Comment> {
        Err(unsupported("find_issue_comment"))
    }

    async fn list(&self, _: &Context, _: &str, _: IssueListOptions) -> Reply<Vec<Issue>> {
        Err(unsupported("list_issues"))
    }

    async fn list_comments(&self, _: &Context, _: &str, _: u64, _: ListOptions) -> Reply<Vec<Comment>> {
        Err(unsupported("list_issue_comments"))
    }

    async fn list_labels(&self, _: &Context, _: &str, _: u64, _: ListOptions) -> Reply<Vec<Label>> {
        Err(unsupported("list_issue_labels"))
    }

    async fn list_events(
        &self,
        _: &Context,
        _: &str,
        _: u64,
        _: ListOptions,
    ) -> Reply<Vec<ListedIssueEvent>> {
        Err(unsupported("list_issue_events"))
    }

    async fn create(&self, _: &Context, _: &str, _: &IssueInput) -> Reply<Issue> {
        Err(unsupported("create_issue"))
    }

    async fn create_comment(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        input: &CommentInput,
    ) -> Reply<Comment> {
        let request = Request::post(format!("{}/issues/{number}/comments", repo_path(repo)))
            .json(&WireCommentInput { text: &input.body })?;
        let (out, res) = self.api.fetch::<WireComment>(ctx, request).await?;
        Ok((convert_comment(out), res))
    }

    async fn delete_comment(&self, _: &Context, _: &str, _: u64, _: u64) -> Result<Response, ScmError> {
        Err(unsupported("delete_issue_comment"))
    }

    async fn close(&self, _: &Context, _: &str, _: u64) -> Result<Response, ScmError> {
        Err(unsupported("close_issue"))
    }

    async fn lock(&self, _: &Context, _: &str, _: u64) -> Result<Response, ScmError> {
        Err(unsupported("lock_issue"))
    }

    async fn unlock(&self, _: &Context, _: &str, _: u64) -> Result<Response, ScmError> {
        Err(unsupported("unlock_issue"))
    }

    async fn add_label(&self, _: &Context, _: &str, _: u64, _: &str) -> Result<Response, ScmError> {
        Err(unsupported("add_issue_label"))
    }

    async fn delete_label(&self, _: &Context, _: &str, _: u64, _: &str) -> Result<Response, ScmError> {
        Err(unsupported("delete_issue_label"))
    }

    async fn assign_issue(&self, _: &Context, _: &str, _: u64, _: &[String]) -> Result<Response, ScmError> {
        Err(unsupported("assign_issue"))
    }

    async fn unassign_issue(
        &self,
        _: &Context,
        _: &str,
        _: u64,
        _: &[String],
    ) -> Result<Response, ScmError> {
        Err(unsupported("unassign_issue"))
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
