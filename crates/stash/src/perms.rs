//! Repository permission inference.
//!
//! Stash has no endpoint reporting the caller's own permission on a
//! repository, so it is inferred by probing operations of decreasing
//! privilege. The result is a best-effort hint for UI and routing
//! decisions. It is not an authorization check.
//!
//! A probe that fails with an HTTP status counts as "not granted". Network
//! failures, cancellation and deadline expiry abort the resolution instead
//! of being read as a lack of privilege.

use tracing::warn;

use scm::{split, Context, Perm, Reply, RepositoryService, Response, ScmError};

use crate::StashClient;

/// A privileged operation whose success implies a permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// Listing webhooks requires repository admin.
    ListHooks,
    /// The repository shows up among those the caller may write to.
    WritableList,
}

/// Probes in decreasing order of privilege. The first that succeeds wins.
const LADDER: &[(Probe, Perm)] = &[
    (Probe::ListHooks, Perm::ADMIN),
    (Probe::WritableList, Perm::WRITE),
];

pub(crate) async fn resolve(client: &StashClient, ctx: &Context, repo: &str) -> Reply<Perm> {
    let response = match RepositoryService::find(client, ctx, repo).await {
        Ok((_, response)) => response,
        Err(err) if err.is_transport_failure() => return Err(err),
        Err(err) => {
            warn!(repo, error = %err, "repository not readable, reporting no access");
            return Ok((Perm::NONE, Response::default()));
        }
    };

    for (probe, grants) in LADDER {
        match run(client, ctx, repo, *probe).await {
            Ok(true) => return Ok((*grants, response)),
            Ok(false) => {}
            Err(err) if err.is_transport_failure() => return Err(err),
            Err(err) => {
                warn!(repo, probe = ?probe, error = %err, "permission probe failed, treating as not granted");
            }
        }
    }
    Ok((Perm::READ, response))
}

async fn run(client: &StashClient, ctx: &Context, repo: &str, probe: Probe) -> Result<bool, ScmError> {
    match probe {
        Probe::ListHooks => {
            client
                .list_hooks(ctx, repo, scm::ListOptions::default())
                .await?;
            Ok(true)
        }
        Probe::WritableList => {
            let (_, name) = split(repo);
            let (writable, _) = client.list_writable(ctx, repo).await?;
            Ok(writable.iter().any(|candidate| candidate.slug == name))
        }
    }
}

#[cfg(test)]
#[path = "perms_tests.rs"]
mod tests;
