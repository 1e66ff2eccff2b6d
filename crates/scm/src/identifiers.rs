//! Newtype identifiers and the repository-identifier parsing contract.
//!
//! Provider-assigned identifiers are opaque: a GitHub repository id is an
//! integer, a Stash webhook id is an integer, another provider may use a UUID.
//! They are carried as strings and never parsed.
//!
//! Every operation addresses a repository with a single `namespace/name`
//! string. [`split`] is the one function every adapter uses to take it apart.

use serde::{Deserialize, Serialize};

use crate::ScmError;

// ---------------------------------------------------------------------------
// Macro for String-wrapped opaque identifiers.
// Generates: struct, new() returning Option<Self>, as_str(), Display,
// From<u64> for providers that hand out integers.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Provider-assigned repository identifier. Opaque; must not be parsed.
    RepoId
}

string_id! {
    /// Provider-assigned webhook identifier. Opaque; must not be parsed.
    HookId
}

// ---------------------------------------------------------------------------
// Repository identifier
// ---------------------------------------------------------------------------

/// Splits a repository identifier into `(namespace, name)` at the first `/`.
///
/// With no `/`, the namespace is empty and the whole input is the name.
/// Everything after the first `/` belongs to the name, so nested namespaces
/// are not supported.
pub fn split(repo: &str) -> (&str, &str) {
    match repo.split_once('/') {
        Some((namespace, name)) => (namespace, name),
        None => ("", repo),
    }
}

/// Joins a namespace and name back into the `namespace/name` form.
pub fn join(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}/{name}")
    }
}

/// A validated `namespace/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    namespace: String,
    name: String,
}

impl RepoRef {
    /// Parses `namespace/name`, rejecting identifiers where either part is empty.
    pub fn parse(repo: &str) -> Result<Self, ScmError> {
        let (namespace, name) = split(repo);
        if namespace.is_empty() || name.is_empty() {
            return Err(ScmError::InvalidRepository {
                value: repo.to_string(),
            });
        }
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Owner, organisation or project key.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Repository name (slug on Stash).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl std::str::FromStr for RepoRef {
    type Err = ScmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
