//! Command dispatch: maps parsed arguments onto capability calls.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde_json::{json, Value};
use tracing::info;

use scm::{
    collect_all, Client, CommentInput, Context, Driver, HookInput, IssueListOptions, ListOptions,
    PullRequestListOptions, Reply, Response, StatusInput, Transport,
};
use transport::{ClientConfig, HttpTransport};

use crate::args::{
    hook_events, Command, HookCommand, IssueCommand, PageArgs, PrCommand, RepoCommand,
    StatusCommand,
};

/// Builds the client for `config`, filling in the github.com API root when
/// no base URL is configured.
pub fn connect(mut config: ClientConfig) -> Result<Client> {
    if config.base_url.is_none() && config.driver == Driver::Github {
        config.base_url = Some(github::DEFAULT_BASE_URL.to_string());
    }
    let transport = HttpTransport::new(&config).context("failed to build HTTP transport")?;
    info!(driver = %config.driver, base_url = %transport.base_url(), "connected");
    Ok(client_for(config.driver, Arc::new(transport)))
}

/// Selects the adapter for `driver`.
pub fn client_for(driver: Driver, transport: Arc<dyn Transport>) -> Client {
    match driver {
        Driver::Github => github::client(transport),
        Driver::Stash => stash::client(transport),
    }
}

/// Runs `command` and returns its result as JSON.
pub async fn run(client: &Client, ctx: &Context, command: Command) -> Result<Value> {
    match command {
        Command::Repo { command } => repo(client, ctx, command).await,
        Command::Hook { command } => hook(client, ctx, command).await,
        Command::Status { command } => status(client, ctx, command).await,
        Command::Issue { command } => issue(client, ctx, command).await,
        Command::Pr { command } => pr(client, ctx, command).await,
    }
}

async fn repo(client: &Client, ctx: &Context, command: RepoCommand) -> Result<Value> {
    let repos = client.repositories();
    match command {
        RepoCommand::Find { repo } => to_json(repos.find(ctx, &repo).await?.0),
        RepoCommand::Perms { repo } => to_json(repos.find_perms(ctx, &repo).await?.0),
        RepoCommand::List { page } => {
            let items = list(page, |opts| repos.list(ctx, opts)).await?;
            to_json(items)
        }
    }
}

async fn hook(client: &Client, ctx: &Context, command: HookCommand) -> Result<Value> {
    let repos = client.repositories();
    match command {
        HookCommand::List { repo, page } => {
            let items = list(page, |opts| repos.list_hooks(ctx, &repo, opts)).await?;
            to_json(items)
        }
        HookCommand::Create {
            repo,
            target,
            name,
            secret,
            events,
            native_events,
            skip_verify,
        } => {
            let input = HookInput {
                name,
                target,
                secret,
                events: hook_events(&events),
                native_events,
                skip_verify,
            };
            to_json(repos.create_hook(ctx, &repo, &input).await?.0)
        }
        HookCommand::Delete { repo, id } => {
            let response = repos.delete_hook(ctx, &repo, &id).await?;
            Ok(acknowledged(&response))
        }
    }
}

async fn status(client: &Client, ctx: &Context, command: StatusCommand) -> Result<Value> {
    let repos = client.repositories();
    match command {
        StatusCommand::List {
            repo,
            reference,
            page,
        } => {
            let items = list(page, |opts| repos.list_status(ctx, &repo, &reference, opts)).await?;
            to_json(items)
        }
        StatusCommand::Combined { repo, reference } => {
            to_json(repos.find_combined_status(ctx, &repo, &reference).await?.0)
        }
        StatusCommand::Create {
            repo,
            reference,
            state,
            label,
            desc,
            target,
        } => {
            let input = StatusInput {
                state: state.into(),
                label,
                desc,
                target,
            };
            to_json(repos.create_status(ctx, &repo, &reference, &input).await?.0)
        }
    }
}

async fn issue(client: &Client, ctx: &Context, command: IssueCommand) -> Result<Value> {
    let issues = client.issues();
    match command {
        IssueCommand::Find { repo, number } => to_json(issues.find(ctx, &repo, number).await?.0),
        IssueCommand::List { repo, filter, page } => {
            let items = list(page, |opts| {
                let opts = IssueListOptions {
                    page: opts.page,
                    size: opts.size,
                    open: filter.open,
                    closed: filter.closed,
                };
                issues.list(ctx, &repo, opts)
            })
            .await?;
            to_json(items)
        }
        IssueCommand::Comment { repo, number, body } => {
            let input = CommentInput { body };
            to_json(issues.create_comment(ctx, &repo, number, &input).await?.0)
        }
        IssueCommand::Close { repo, number } => {
            let response = issues.close(ctx, &repo, number).await?;
            Ok(acknowledged(&response))
        }
    }
}

async fn pr(client: &Client, ctx: &Context, command: PrCommand) -> Result<Value> {
    let prs = client.pull_requests();
    match command {
        PrCommand::Find { repo, number } => to_json(prs.find(ctx, &repo, number).await?.0),
        PrCommand::List { repo, filter, page } => {
            let items = list(page, |opts| {
                let opts = PullRequestListOptions {
                    page: opts.page,
                    size: opts.size,
                    open: filter.open,
                    closed: filter.closed,
                };
                prs.list(ctx, &repo, opts)
            })
            .await?;
            to_json(items)
        }
        PrCommand::Merge { repo, number } => {
            let response = prs.merge(ctx, &repo, number).await?;
            Ok(acknowledged(&response))
        }
    }
}

/// Fetches one page, or every page when `--all` is set.
async fn list<T, F, Fut>(page: PageArgs, mut fetch: F) -> Result<Vec<T>, scm::ScmError>
where
    F: FnMut(ListOptions) -> Fut,
    Fut: std::future::Future<Output = Reply<Vec<T>>>,
{
    if page.all {
        collect_all(page.list_options(), fetch).await
    } else {
        Ok(fetch(page.list_options()).await?.0)
    }
}

fn acknowledged(response: &Response) -> Value {
    json!({ "status": response.status })
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("failed to encode result")
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
