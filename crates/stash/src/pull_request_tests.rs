use std::sync::Arc;

use scm::testing::FakeTransport;
use scm::Method;
use serde_json::json;

use super::*;

const REPO: &str = "PRJ/my-repo";
const PR_PATH: &str = "rest/api/1.0/projects/PRJ/repos/my-repo/pull-requests";

fn adapter(fake: FakeTransport) -> (StashClient, Arc<FakeTransport>) {
    let fake = Arc::new(fake);
    (StashClient::new(fake.clone()), fake)
}

fn pull_json(id: u64, state: &str) -> serde_json::Value {
    json!({
        "id": id,
        "version": 3,
        "title": "Talking Nerdy",
        "description": "It's a kludge, but put the tuple from the database in the cache.",
        "state": state,
        "open": state == "OPEN",
        "closed": state != "OPEN",
        "createdDate": 1359075920000_i64,
        "updatedDate": 1359085920000_i64,
        "fromRef": {"id": "refs/heads/feature-ABC-123", "displayId": "feature-ABC-123", "latestCommit": "babecafe"},
        "toRef": {"id": "refs/heads/master", "displayId": "master", "latestCommit": "deadbeef"},
        "author": {"user": {"name": "tom", "slug": "tom", "displayName": "Tom", "emailAddress": "tom@example.com"}, "role": "AUTHOR"},
        "links": {"self": [{"href": "https://stash.example.com/projects/PRJ/repos/my-repo/pull-requests/1"}]}
    })
}

#[tokio::test]
async fn find_converts_refs_and_times() {
    let (stash, _) = adapter(FakeTransport::new().respond(
        Method::Get,
        &format!("{PR_PATH}/1"),
        200,
        pull_json(1, "OPEN"),
    ));
    let (pr, _) = stash.find(&Context::background(), REPO, 1).await.unwrap();
    assert_eq!(pr.number, 1);
    assert_eq!(pr.source, "feature-ABC-123");
    assert_eq!(pr.target, "master");
    assert_eq!(pr.sha, "babecafe");
    assert_eq!(pr.author.login, "tom");
    assert_eq!(pr.link, "https://stash.example.com/projects/PRJ/repos/my-repo/pull-requests/1");
    assert!(!pr.closed);
    assert!(!pr.merged);
    assert_eq!(pr.created.unwrap().to_string(), "2013-01-25T01:05:20+00:00");
}

#[tokio::test]
async fn closed_only_listing_drops_open_entries() {
    let (stash, fake) = adapter(FakeTransport::new().respond(
        Method::Get,
        PR_PATH,
        200,
        json!({
            "isLastPage": false,
            "values": [pull_json(1, "OPEN"), pull_json(2, "MERGED"), pull_json(3, "DECLINED")]
        }),
    ));
    let opts = PullRequestListOptions {
        page: 1,
        size: 3,
        closed: true,
        ..Default::default()
    };
    let (prs, res) = stash.list(&Context::background(), REPO, opts).await.unwrap();
    let numbers: Vec<u64> = prs.iter().map(|pr| pr.number).collect();
    assert_eq!(numbers, vec![2, 3]);
    assert!(prs[0].merged);
    assert!(!prs[1].merged);
    assert_eq!(res.page.next, Some(2));
    assert!(fake
        .last_request()
        .unwrap()
        .query
        .contains(&("state".to_string(), "ALL".to_string())));
}

#[tokio::test]
async fn open_only_listing_filters_server_side() {
    let (stash, fake) = adapter(FakeTransport::new().respond(
        Method::Get,
        PR_PATH,
        200,
        json!({"isLastPage": true, "values": [pull_json(1, "OPEN")]}),
    ));
    let opts = PullRequestListOptions {
        open: true,
        ..Default::default()
    };
    stash.list(&Context::background(), REPO, opts).await.unwrap();
    assert!(fake
        .last_request()
        .unwrap()
        .query
        .contains(&("state".to_string(), "OPEN".to_string())));
}

#[tokio::test]
async fn list_comments_reads_commented_activities() {
    let (stash, _) = adapter(FakeTransport::new().respond(
        Method::Get,
        &format!("{PR_PATH}/1/activities"),
        200,
        json!({
            "isLastPage": true,
            "values": [
                {"id": 1, "action": "OPENED", "user": {"name": "tom"}},
                {"id": 2, "action": "COMMENTED", "commentAction": "ADDED",
                 "comment": {"id": 10, "text": "LGTM", "author": {"name": "jane", "slug": "jane"}, "createdDate": 1359075920000_i64}},
                {"id": 3, "action": "APPROVED", "user": {"name": "jane"}}
            ]
        }),
    ));
    let (comments, _) = stash
        .list_comments(&Context::background(), REPO, 1, ListOptions::default())
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, 10);
    assert_eq!(comments[0].body, "LGTM");
    assert!(comments[0].updated.is_none());
}

#[tokio::test]
async fn merge_sends_current_version() {
    let (stash, fake) = adapter(
        FakeTransport::new()
            .respond(Method::Get, &format!("{PR_PATH}/1"), 200, pull_json(1, "OPEN"))
            .respond(Method::Post, &format!("{PR_PATH}/1/merge"), 200, pull_json(1, "MERGED")),
    );
    stash.merge(&Context::background(), REPO, 1).await.unwrap();
    let request = fake.last_request().unwrap();
    assert_eq!(request.path, format!("{PR_PATH}/1/merge"));
    assert_eq!(request.query, vec![("version".to_string(), "3".to_string())]);
}

#[tokio::test]
async fn close_declines_pull_request() {
    let (stash, fake) = adapter(
        FakeTransport::new()
            .respond(Method::Get, &format!("{PR_PATH}/1"), 200, pull_json(1, "OPEN"))
            .respond(Method::Post, &format!("{PR_PATH}/1/decline"), 200, pull_json(1, "DECLINED")),
    );
    stash.close(&Context::background(), REPO, 1).await.unwrap();
    assert_eq!(fake.last_request().unwrap().path, format!("{PR_PATH}/1/decline"));
}

#[tokio::test]
async fn stale_version_conflict_is_reported() {
    let (stash, _) = adapter(
        FakeTransport::new()
            .respond(Method::Get, &format!("{PR_PATH}/1"), 200, pull_json(1, "OPEN"))
            .respond(
                Method::Post,
                &format!("{PR_PATH}/1/merge"),
                409,
                json!({"errors": [{"message": "You are attempting to modify a pull request based on out-of-date information."}]}),
            ),
    );
    let err = stash.merge(&Context::background(), REPO, 1).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
}
