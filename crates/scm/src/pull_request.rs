//! Pull request entities.

use serde::{Deserialize, Serialize};

use crate::{ListOptions, Timestamp, User};

/// A pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Provider-local sequence number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Description.
    pub body: String,
    /// Head commit SHA.
    pub sha: String,
    /// Source branch name.
    pub source: String,
    /// Target branch name.
    pub target: String,
    /// Web URL.
    pub link: String,
    /// Whether the pull request is closed (merged or declined).
    pub closed: bool,
    /// Whether the pull request was merged.
    pub merged: bool,
    /// Pull request author.
    pub author: User,
    /// Creation time, if known.
    pub created: Option<Timestamp>,
    /// Last update time, if known.
    pub updated: Option<Timestamp>,
}

/// Options for listing pull requests.
///
/// Setting both `open` and `closed` (or neither) lists every pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestListOptions {
    /// Requested page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Include open pull requests.
    pub open: bool,
    /// Include closed pull requests.
    pub closed: bool,
}

impl PullRequestListOptions {
    /// The paging part of these options.
    pub fn list_options(&self) -> ListOptions {
        ListOptions::new(self.page, self.size)
    }
}
