use std::sync::Arc;

use scm::testing::FakeTransport;
use scm::Method;
use serde_json::json;

use super::*;

fn adapter(fake: FakeTransport) -> (GithubClient, Arc<FakeTransport>) {
    let fake = Arc::new(fake);
    (GithubClient::new(fake.clone()), fake)
}

fn pull_json(state: &str, merged_at: Option<&str>) -> serde_json::Value {
    json!({
        "number": 1347,
        "state": state,
        "title": "Amazing new feature",
        "body": "Please pull these awesome changes in!",
        "html_url": "https://github.com/octocat/Hello-World/pull/1347",
        "user": {"login": "octocat"},
        "head": {"ref": "new-topic", "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e"},
        "base": {"ref": "main", "sha": "a1b2c3"},
        "merged_at": merged_at,
        "created_at": "2011-01-26T19:01:12Z",
        "updated_at": "2011-01-26T19:01:12Z"
    })
}

#[tokio::test]
async fn find_converts_branches_and_sha() {
    let (github, _) = adapter(FakeTransport::new().respond(
        Method::Get,
        "repos/octocat/Hello-World/pulls/1347",
        200,
        pull_json("open", None),
    ));
    let (pr, _) = github
        .find(&Context::background(), "octocat/Hello-World", 1347)
        .await
        .unwrap();
    assert_eq!(pr.number, 1347);
    assert_eq!(pr.source, "new-topic");
    assert_eq!(pr.target, "main");
    assert_eq!(pr.sha, "6dcb09b5b57875f334f61aebed695e2e4193db5e");
    assert!(!pr.closed);
    assert!(!pr.merged);
    assert_eq!(pr.author.login, "octocat");
}

#[tokio::test]
async fn merged_at_marks_pull_request_merged() {
    let (github, _) = adapter(FakeTransport::new().respond(
        Method::Get,
        "repos/octocat/Hello-World/pulls",
        200,
        json!([
            pull_json("closed", Some("2011-01-27T10:00:00Z")),
            pull_json("closed", None)
        ]),
    ));
    let opts = PullRequestListOptions {
        closed: true,
        ..Default::default()
    };
    let (prs, _) = github
        .list(&Context::background(), "octocat/Hello-World", opts)
        .await
        .unwrap();
    assert!(prs[0].closed && prs[0].merged);
    assert!(prs[1].closed && !prs[1].merged);
}

#[tokio::test]
async fn list_comments_reads_issue_conversation() {
    let (github, fake) = adapter(FakeTransport::new().respond(
        Method::Get,
        "repos/octocat/Hello-World/issues/1347/comments",
        200,
        json!([{"id": 1, "body": "LGTM", "user": {"login": "hubot"}}]),
    ));
    let (comments, _) = github
        .list_comments(&Context::background(), "octocat/Hello-World", 1347, ListOptions::default())
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author.login, "hubot");
    assert_eq!(fake.requests().len(), 1);
}

#[tokio::test]
async fn merge_puts_merge_resource() {
    let (github, fake) = adapter(FakeTransport::new().respond(
        Method::Put,
        "repos/octocat/Hello-World/pulls/1347/merge",
        200,
        json!({"merged": true, "message": "Pull Request successfully merged"}),
    ));
    let res = github
        .merge(&Context::background(), "octocat/Hello-World", 1347)
        .await
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(fake.last_request().unwrap().method, Method::Put);
}

#[tokio::test]
async fn merge_conflict_surfaces_status_and_message() {
    let (github, _) = adapter(FakeTransport::new().respond(
        Method::Put,
        "repos/octocat/Hello-World/pulls/1347/merge",
        405,
        json!({"message": "Pull Request is not mergeable"}),
    ));
    let err = github
        .merge(&Context::background(), "octocat/Hello-World", 1347)
        .await
        .unwrap_err();
    match err {
        ScmError::UnexpectedStatus { status, message, .. } => {
            assert_eq!(status, 405);
            assert_eq!(message, "Pull Request is not mergeable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn close_patches_pull_state() {
    let (github, fake) = adapter(FakeTransport::new().respond(
        Method::Patch,
        "repos/octocat/Hello-World/pulls/1347",
        200,
        pull_json("closed", None),
    ));
    github
        .close(&Context::background(), "octocat/Hello-World", 1347)
        .await
        .unwrap();
    assert_eq!(fake.last_request().unwrap().body, Some(json!({"state": "closed"})));
}
