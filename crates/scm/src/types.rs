//! Shared value types used across every resource family.
//!
//! Entities here are value snapshots: they carry no back-reference to the
//! adapter that produced them, and every read is a fresh fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Provider selection
// ---------------------------------------------------------------------------

/// Identifies which provider adapter produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// GitHub and GitHub Enterprise (`api/v3`).
    Github,
    /// Bitbucket Server, formerly Atlassian Stash (`rest/api/1.0`).
    #[serde(alias = "bitbucketserver")]
    Stash,
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Github => f.write_str("github"),
            Self::Stash => f.write_str("stash"),
        }
    }
}

impl std::str::FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Self::Github),
            "stash" | "bitbucketserver" => Ok(Self::Stash),
            other => Err(format!("unknown driver '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// People and permissions
// ---------------------------------------------------------------------------

/// A user account on the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login or username.
    pub login: String,
    /// Display name.
    pub name: String,
    /// Email address, when the provider exposes it.
    pub email: String,
    /// Avatar URL, when the provider exposes it.
    pub avatar: String,
}

/// Permissions the authenticated user holds on a repository.
///
/// `admin ⇒ push ⇒ pull` is the expected convention but is not enforced.
/// Providers without a native permission endpoint approximate these flags
/// heuristically, so callers must tolerate under- and over-approximation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Perm {
    /// May read and clone.
    pub pull: bool,
    /// May push.
    pub push: bool,
    /// May administer (webhooks, settings).
    pub admin: bool,
}

impl Perm {
    /// No access at all.
    pub const NONE: Perm = Perm {
        pull: false,
        push: false,
        admin: false,
    };
    /// Read-only access.
    pub const READ: Perm = Perm {
        pull: true,
        push: false,
        admin: false,
    };
    /// Read and write access.
    pub const WRITE: Perm = Perm {
        pull: true,
        push: true,
        admin: false,
    };
    /// Full administrative access.
    pub const ADMIN: Perm = Perm {
        pull: true,
        push: true,
        admin: true,
    };
}

/// A repository or issue label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
    /// Hex colour without the leading `#`.
    pub color: String,
    /// Optional description.
    pub description: String,
    /// API URL of the label.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Page request for list operations.
///
/// `page` is 1-based; `0` means "first page". `size == 0` leaves the page
/// size to the provider default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Requested page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
}

impl ListOptions {
    /// Creates options for `page` with `size` items per page.
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// The page index actually requested, treating `0` as page 1.
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    /// The same options pointing at `page`.
    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a [`Timestamp`] from Unix epoch milliseconds.
    ///
    /// Returns `None` for `0` (Stash's "unset") or out-of-range values.
    pub fn from_millis(millis: i64) -> Option<Self> {
        if millis == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
