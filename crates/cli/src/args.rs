//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use scm::{Driver, HookEvents, State};

#[derive(Debug, Parser)]
#[command(name = "scm-bridge", version)]
#[command(about = "Query and manage repositories on GitHub or Bitbucket Server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file. Defaults to .scm/config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Provider to talk to, overriding the configuration file.
    #[arg(long, global = true)]
    pub driver: Option<Driver>,

    /// API root, overriding the configuration file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Repository queries
    Repo {
        #[command(subcommand)]
        command: RepoCommand,
    },
    /// Webhook management
    Hook {
        #[command(subcommand)]
        command: HookCommand,
    },
    /// Commit statuses
    Status {
        #[command(subcommand)]
        command: StatusCommand,
    },
    /// Issues
    Issue {
        #[command(subcommand)]
        command: IssueCommand,
    },
    /// Pull requests
    Pr {
        #[command(subcommand)]
        command: PrCommand,
    },
}

#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// Page to fetch, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Items per page.
    #[arg(long, default_value_t = 30)]
    pub size: u32,

    /// Follow pagination and print every page.
    #[arg(long)]
    pub all: bool,
}

impl PageArgs {
    pub fn list_options(&self) -> scm::ListOptions {
        scm::ListOptions::new(self.page, self.size)
    }
}

#[derive(Debug, Subcommand)]
pub enum RepoCommand {
    /// Show one repository
    Find { repo: String },
    /// Show the caller's permissions on a repository
    Perms { repo: String },
    /// List repositories visible to the caller
    List {
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum HookCommand {
    /// List webhooks
    List {
        repo: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Register a webhook
    Create {
        repo: String,
        /// Delivery URL.
        #[arg(long)]
        target: String,
        /// Hook name, where the provider supports one.
        #[arg(long, default_value = "scm-bridge")]
        name: String,
        /// Shared secret for signing deliveries.
        #[arg(long, default_value = "")]
        secret: String,
        /// Provider-independent triggers.
        #[arg(long, value_enum, value_delimiter = ',')]
        events: Vec<EventArg>,
        /// Vendor event names passed through unchanged.
        #[arg(long = "native", value_delimiter = ',')]
        native_events: Vec<String>,
        /// Disable TLS verification of deliveries.
        #[arg(long)]
        skip_verify: bool,
    },
    /// Remove a webhook
    Delete { repo: String, id: String },
}

#[derive(Debug, Subcommand)]
pub enum StatusCommand {
    /// List statuses reported for a commit
    List {
        repo: String,
        reference: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show the combined status of a commit
    Combined { repo: String, reference: String },
    /// Report a status for a commit
    Create {
        repo: String,
        reference: String,
        #[arg(long, value_enum)]
        state: StateArg,
        /// Context name identifying the reporter.
        #[arg(long)]
        label: String,
        #[arg(long, default_value = "")]
        desc: String,
        /// Link to details.
        #[arg(long, default_value = "")]
        target: String,
    },
}

#[derive(Debug, Clone, Copy, Args)]
pub struct StateFilter {
    /// Only open entries.
    #[arg(long, conflicts_with = "closed")]
    pub open: bool,
    /// Only closed entries.
    #[arg(long)]
    pub closed: bool,
}

#[derive(Debug, Subcommand)]
pub enum IssueCommand {
    /// Show one issue
    Find { repo: String, number: u64 },
    /// List issues
    List {
        repo: String,
        #[command(flatten)]
        filter: StateFilter,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Comment on an issue
    Comment {
        repo: String,
        number: u64,
        #[arg(long)]
        body: String,
    },
    /// Close an issue
    Close { repo: String, number: u64 },
}

#[derive(Debug, Subcommand)]
pub enum PrCommand {
    /// Show one pull request
    Find { repo: String, number: u64 },
    /// List pull requests
    List {
        repo: String,
        #[command(flatten)]
        filter: StateFilter,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Merge a pull request
    Merge { repo: String, number: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventArg {
    Push,
    PullRequest,
    PullRequestComment,
    Issue,
    IssueComment,
    Branch,
    Tag,
}

/// Folds the selected triggers into a [`HookEvents`] selection.
pub fn hook_events(selected: &[EventArg]) -> HookEvents {
    let mut events = HookEvents::default();
    for event in selected {
        match event {
            EventArg::Push => events.push = true,
            EventArg::PullRequest => events.pull_request = true,
            EventArg::PullRequestComment => events.pull_request_comment = true,
            EventArg::Issue => events.issue = true,
            EventArg::IssueComment => events.issue_comment = true,
            EventArg::Branch => events.branch = true,
            EventArg::Tag => events.tag = true,
        }
    }
    events
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    Pending,
    Running,
    Success,
    Failure,
    Error,
}

impl From<StateArg> for State {
    fn from(value: StateArg) -> Self {
        match value {
            StateArg::Pending => State::Pending,
            StateArg::Running => State::Running,
            StateArg::Success => State::Success,
            StateArg::Failure => State::Failure,
            StateArg::Error => State::Error,
        }
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
