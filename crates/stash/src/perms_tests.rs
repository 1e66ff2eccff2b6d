use std::sync::Arc;

use scm::testing::FakeTransport;
use scm::Method;
use serde_json::json;

use super::*;

const REPO: &str = "PRJ/my-repo";
const REPO_PATH: &str = "rest/api/1.0/projects/PRJ/repos/my-repo";

fn hooks_path() -> String {
    format!("{REPO_PATH}/webhooks")
}

fn readable() -> FakeTransport {
    FakeTransport::new().respond(
        Method::Get,
        REPO_PATH,
        200,
        json!({"slug": "my-repo", "id": 1, "project": {"key": "PRJ"}}),
    )
}

fn writable(slugs: &[&str]) -> serde_json::Value {
    let values: Vec<_> = slugs
        .iter()
        .map(|slug| json!({"slug": slug, "project": {"key": "PRJ"}}))
        .collect();
    json!({"isLastPage": true, "values": values})
}

async fn resolve_with(fake: FakeTransport) -> (Result<Perm, ScmError>, Arc<FakeTransport>) {
    let fake = Arc::new(fake);
    let client = StashClient::new(fake.clone());
    let result = resolve(&client, &Context::background(), REPO)
        .await
        .map(|(perm, _)| perm);
    (result, fake)
}

#[tokio::test]
async fn unreadable_repository_has_no_access() {
    let fake = FakeTransport::new().respond(
        Method::Get,
        REPO_PATH,
        403,
        json!({"errors": [{"message": "forbidden"}]}),
    );
    let (result, fake) = resolve_with(fake).await;
    assert_eq!(result.unwrap(), Perm::NONE);
    assert_eq!(fake.requests().len(), 1);
}

#[tokio::test]
async fn webhook_access_implies_admin() {
    let fake = readable().respond(
        Method::Get,
        &hooks_path(),
        200,
        json!({"isLastPage": true, "values": []}),
    );
    let (result, fake) = resolve_with(fake).await;
    assert_eq!(result.unwrap(), Perm::ADMIN);
    assert_eq!(fake.requests().len(), 2);
}

#[tokio::test]
async fn writable_listing_implies_write() {
    let fake = readable()
        .respond(Method::Get, &hooks_path(), 401, json!({}))
        .respond(
            Method::Get,
            "rest/api/1.0/repos",
            200,
            writable(&["other", "my-repo"]),
        );
    let (result, fake) = resolve_with(fake).await;
    assert_eq!(result.unwrap(), Perm::WRITE);
    let last = fake.last_request().unwrap();
    assert!(last
        .query
        .contains(&("permission".to_string(), "REPO_WRITE".to_string())));
    assert!(last.query.contains(&("project".to_string(), "PRJ".to_string())));
    assert!(last.query.contains(&("name".to_string(), "my-repo".to_string())));
}

#[tokio::test]
async fn no_privileged_probe_falls_back_to_read() {
    let fake = readable()
        .respond(Method::Get, &hooks_path(), 401, json!({}))
        .respond(Method::Get, "rest/api/1.0/repos", 200, writable(&["other"]));
    let (result, _) = resolve_with(fake).await;
    assert_eq!(result.unwrap(), Perm::READ);
}

#[tokio::test]
async fn failing_write_probe_falls_back_to_read() {
    let fake = readable()
        .respond(Method::Get, &hooks_path(), 401, json!({}))
        .respond(Method::Get, "rest/api/1.0/repos", 500, json!({}));
    let (result, _) = resolve_with(fake).await;
    assert_eq!(result.unwrap(), Perm::READ);
}

#[tokio::test]
async fn transport_failure_during_probe_aborts() {
    let fake = readable().fail(Method::Get, &hooks_path(), "connection reset");
    let (result, _) = resolve_with(fake).await;
    assert!(matches!(result, Err(ScmError::Transport { .. })));
}

#[tokio::test]
async fn canceled_context_aborts_before_probing() {
    let fake = Arc::new(readable());
    let client = StashClient::new(fake.clone());
    let (ctx, cancel) = Context::background().with_cancel();
    cancel.cancel();
    let err = resolve(&client, &ctx, REPO).await.unwrap_err();
    assert!(matches!(err, ScmError::Canceled));
    assert!(fake.requests().is_empty());
}
