//! Capability traits: one per resource family.
//!
//! Every adapter implements every method. Where a provider has no equivalent
//! operation the method returns [`ScmError::NotSupported`], so callers probe
//! capability through the error kind instead of the adapter type.
//!
//! All methods take the caller's [`Context`] and address repositories with a
//! `namespace/name` string.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    CombinedStatus, Comment, CommentInput, Context, Driver, Hook, HookInput, Issue, IssueInput,
    IssueListOptions, Label, ListOptions, ListedIssueEvent, Perm, PullRequest,
    PullRequestListOptions, Repository, Response, ScmError, Status, StatusInput, User,
};

/// Result of an operation that returns an entity.
pub type Reply<T> = Result<(T, Response), ScmError>;

/// Repository, webhook and commit-status operations.
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// Returns the repository.
    async fn find(&self, ctx: &Context, repo: &str) -> Reply<Repository>;

    /// Returns a webhook by id.
    async fn find_hook(&self, ctx: &Context, repo: &str, id: &str) -> Reply<Hook>;

    /// Returns the authenticated user's permissions on the repository.
    async fn find_perms(&self, ctx: &Context, repo: &str) -> Reply<Perm>;

    /// Returns the vendor permission name `user` holds on the repository.
    async fn find_user_permission(&self, ctx: &Context, repo: &str, user: &str) -> Reply<String>;

    /// Returns whether `user` is a collaborator on the repository.
    async fn is_collaborator(&self, ctx: &Context, repo: &str, user: &str) -> Reply<bool>;

    /// Returns every user with access to the repository.
    async fn list_collaborators(&self, ctx: &Context, repo: &str) -> Reply<Vec<User>>;

    /// Returns the repositories visible to the authenticated user.
    async fn list(&self, ctx: &Context, opts: ListOptions) -> Reply<Vec<Repository>>;

    /// Returns the repository's webhooks.
    async fn list_hooks(&self, ctx: &Context, repo: &str, opts: ListOptions) -> Reply<Vec<Hook>>;

    /// Returns the statuses reported for `reference`.
    async fn list_status(
        &self,
        ctx: &Context,
        repo: &str,
        reference: &str,
        opts: ListOptions,
    ) -> Reply<Vec<Status>>;

    /// Returns the rolled-up status for `reference`.
    async fn find_combined_status(
        &self,
        ctx: &Context,
        repo: &str,
        reference: &str,
    ) -> Reply<CombinedStatus>;

    /// Returns the repository's labels.
    async fn list_labels(&self, ctx: &Context, repo: &str, opts: ListOptions) -> Reply<Vec<Label>>;

    /// Registers a webhook.
    async fn create_hook(&self, ctx: &Context, repo: &str, input: &HookInput) -> Reply<Hook>;

    /// Reports a commit status on `reference`.
    async fn create_status(
        &self,
        ctx: &Context,
        repo: &str,
        reference: &str,
        input: &StatusInput,
    ) -> Reply<Status>;

    /// Removes a webhook.
    async fn delete_hook(&self, ctx: &Context, repo: &str, id: &str) -> Result<Response, ScmError>;
}

/// Issue and issue-comment operations.
#[async_trait]
pub trait IssueService: Send + Sync {
    /// Returns an issue by number.
    async fn find(&self, ctx: &Context, repo: &str, number: u64) -> Reply<Issue>;

    /// Returns an issue comment.
    async fn find_comment(&self, ctx: &Context, repo: &str, number: u64, id: u64) -> Reply<Comment>;

    /// Returns the repository's issues.
    async fn list(&self, ctx: &Context, repo: &str, opts: IssueListOptions) -> Reply<Vec<Issue>>;

    /// Returns an issue's comments.
    async fn list_comments(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        opts: ListOptions,
    ) -> Reply<Vec<Comment>>;

    /// Returns the labels on an issue.
    async fn list_labels(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        opts: ListOptions,
    ) -> Reply<Vec<Label>>;

    /// Returns an issue's event timeline.
    async fn list_events(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        opts: ListOptions,
    ) -> Reply<Vec<ListedIssueEvent>>;

    /// Creates an issue.
    async fn create(&self, ctx: &Context, repo: &str, input: &IssueInput) -> Reply<Issue>;

    /// Adds a comment to an issue.
    async fn create_comment(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        input: &CommentInput,
    ) -> Reply<Comment>;

    /// Deletes an issue comment.
    async fn delete_comment(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        id: u64,
    ) -> Result<Response, ScmError>;

    /// Closes an issue.
    async fn close(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError>;

    /// Locks an issue's conversation.
    async fn lock(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError>;

    /// Unlocks an issue's conversation.
    async fn unlock(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError>;

    /// Adds a label to an issue.
    async fn add_label(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<Response, ScmError>;

    /// Removes a label from an issue.
    async fn delete_label(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<Response, ScmError>;

    /// Assigns users to an issue.
    async fn assign_issue(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        logins: &[String],
    ) -> Result<Response, ScmError>;

    /// Removes users from an issue's assignees.
    async fn unassign_issue(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        logins: &[String],
    ) -> Result<Response, ScmError>;
}

/// Pull request operations.
#[async_trait]
pub trait PullRequestService: Send + Sync {
    /// Returns a pull request by number.
    async fn find(&self, ctx: &Context, repo: &str, number: u64) -> Reply<PullRequest>;

    /// Returns the repository's pull requests.
    async fn list(
        &self,
        ctx: &Context,
        repo: &str,
        opts: PullRequestListOptions,
    ) -> Reply<Vec<PullRequest>>;

    /// Returns a pull request's comments.
    async fn list_comments(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        opts: ListOptions,
    ) -> Reply<Vec<Comment>>;

    /// Adds a comment to a pull request.
    async fn create_comment(
        &self,
        ctx: &Context,
        repo: &str,
        number: u64,
        input: &CommentInput,
    ) -> Reply<Comment>;

    /// Merges a pull request.
    async fn merge(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError>;

    /// Closes (declines) a pull request without merging.
    async fn close(&self, ctx: &Context, repo: &str, number: u64) -> Result<Response, ScmError>;
}

/// One configured provider: the capability services of a single adapter.
///
/// The adapter is chosen once at configuration time; every call on the
/// client dispatches to it.
#[derive(Clone)]
pub struct Client {
    driver: Driver,
    repositories: Arc<dyn RepositoryService>,
    issues: Arc<dyn IssueService>,
    pull_requests: Arc<dyn PullRequestService>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Wraps an adapter that implements every capability trait.
    pub fn new<A>(driver: Driver, adapter: Arc<A>) -> Self
    where
        A: RepositoryService + IssueService + PullRequestService + 'static,
    {
        Self {
            driver,
            repositories: adapter.clone(),
            issues: adapter.clone(),
            pull_requests: adapter,
        }
    }

    /// The provider behind this client.
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// Repository, webhook and status operations.
    pub fn repositories(&self) -> &dyn RepositoryService {
        self.repositories.as_ref()
    }

    /// Issue operations.
    pub fn issues(&self) -> &dyn IssueService {
        self.issues.as_ref()
    }

    /// Pull request operations.
    pub fn pull_requests(&self) -> &dyn PullRequestService {
        self.pull_requests.as_ref()
    }
}
