//! Issue and comment entities.

use serde::{Deserialize, Serialize};

use crate::{Label, Timestamp, User};

/// An issue.
///
/// On providers where issues and pull requests share one numbering,
/// `pull_request` marks entries that are really pull requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Provider-local sequence number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Web URL.
    pub link: String,
    /// Raw vendor state, e.g. `"open"`.
    pub state: String,
    /// Label names.
    pub labels: Vec<String>,
    /// Whether the issue is closed.
    pub closed: bool,
    /// Whether the conversation is locked.
    pub locked: bool,
    /// Issue author.
    pub author: User,
    /// Assigned users.
    pub assignees: Vec<User>,
    /// Whether this entry is a pull request.
    pub pull_request: bool,
    /// Creation time, if known.
    pub created: Option<Timestamp>,
    /// Last update time, if known.
    pub updated: Option<Timestamp>,
}

/// Input for creating an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInput {
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
}

/// Options for listing repository issues.
///
/// Setting both `open` and `closed` (or neither) lists every issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueListOptions {
    /// Requested page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Include open issues.
    pub open: bool,
    /// Include closed issues.
    pub closed: bool,
}

impl IssueListOptions {
    /// The paging part of these options.
    pub fn list_options(&self) -> crate::ListOptions {
        crate::ListOptions::new(self.page, self.size)
    }
}

/// A comment on an issue or pull request.
///
/// `id` is numbered independently of [`Issue::number`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Provider-assigned comment identifier.
    pub id: u64,
    /// Body text.
    pub body: String,
    /// Comment author.
    pub author: User,
    /// Web URL, when the provider exposes one.
    pub link: String,
    /// Creation time, if known.
    pub created: Option<Timestamp>,
    /// Last update time, if known.
    pub updated: Option<Timestamp>,
}

/// Input for creating a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInput {
    /// Body text.
    pub body: String,
}

/// An entry of an issue's event timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedIssueEvent {
    /// Vendor event name, e.g. `"labeled"`.
    pub event: String,
    /// User who triggered the event.
    pub actor: User,
    /// Label involved, for label events.
    pub label: Label,
    /// Event time, if known.
    pub created: Option<Timestamp>,
}
