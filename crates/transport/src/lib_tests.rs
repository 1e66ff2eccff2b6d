use std::sync::Arc;

use httpmock::prelude::*;
use scm::{Context, ListOptions, RepositoryService};
use serde_json::json;
use yare::parameterized;

use super::*;

fn config_for(server: &MockServer, driver: scm::Driver, token: Option<&str>) -> ClientConfig {
    let mut config = ClientConfig::new(driver, Some(server.url("/api/v3")));
    config.token = token.map(str::to_string);
    config.user_agent = "scm-tests".to_string();
    config
}

#[parameterized(
    bare_host = { "https://api.github.com", "https://api.github.com/" },
    trailing_slash = { "https://ghe.example.com/api/v3/", "https://ghe.example.com/api/v3/" },
    missing_slash = { "https://ghe.example.com/api/v3", "https://ghe.example.com/api/v3/" },
)]
fn base_url_always_ends_with_slash(raw: &str, expected: &str) {
    assert_eq!(normalize_base_url(raw).unwrap().as_str(), expected);
}

#[test]
fn missing_base_url_is_a_configuration_error() {
    let config = ClientConfig::new(scm::Driver::Github, None);
    let err = HttpTransport::new(&config).unwrap_err();
    assert!(matches!(err, ScmError::Configuration { .. }));
}

#[tokio::test]
async fn sends_auth_user_agent_query_and_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v3/repos/octocat/hello/hooks")
                .query_param("page", "2")
                .header("authorization", "Bearer s3cret")
                .header("user-agent", "scm-tests")
                .header("accept", "application/json")
                .header_exists("x-request-id")
                .json_body(json!({"name": "web"}));
            then.status(201)
                .header("Link", "<https://example.com/x?page=3>; rel=\"next\"")
                .json_body(json!({"id": 1}));
        })
        .await;

    let transport = HttpTransport::new(&config_for(&server, scm::Driver::Github, Some("s3cret"))).unwrap();
    let request = Request::post("repos/octocat/hello/hooks")
        .query("page", 2)
        .json(&json!({"name": "web"}))
        .unwrap();
    let raw = transport.send(request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(raw.status, 201);
    assert_eq!(
        raw.headers.get("link").and_then(|v| v.first()).map(String::as_str),
        Some("<https://example.com/x?page=3>; rel=\"next\"")
    );
    assert_eq!(raw.body, br#"{"id":1}"#.to_vec());
}

#[tokio::test]
async fn error_statuses_are_returned_not_raised() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/repos/octocat/missing");
            then.status(404).json_body(json!({"message": "Not Found"}));
        })
        .await;

    let transport = HttpTransport::new(&config_for(&server, scm::Driver::Github, None)).unwrap();
    let raw = transport
        .send(Request::get("repos/octocat/missing"))
        .await
        .unwrap();
    assert_eq!(raw.status, 404);
}

#[tokio::test]
async fn connection_failure_maps_to_transport_error() {
    let mut config = ClientConfig::new(scm::Driver::Github, Some("http://127.0.0.1:1/".to_string()));
    config.timeout_secs = 2;
    let transport = HttpTransport::new(&config).unwrap();
    let err = transport.send(Request::get("user/repos")).await.unwrap_err();
    assert!(err.is_transport_failure());
}

#[tokio::test]
async fn github_adapter_over_http_follows_link_pages() {
    let server = MockServer::start_async().await;
    let next = server.url("/api/v3/user/repos?page=2&per_page=1");
    let first = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/user/repos").query_param("page", "1");
            then.status(200)
                .header("Link", format!("<{next}>; rel=\"next\""))
                .json_body(json!([{"id": 1, "name": "a", "full_name": "octocat/a", "owner": {"login": "octocat"}}]));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/user/repos").query_param("page", "2");
            then.status(200)
                .json_body(json!([{"id": 2, "name": "b", "full_name": "octocat/b", "owner": {"login": "octocat"}}]));
        })
        .await;

    let transport = HttpTransport::new(&config_for(&server, scm::Driver::Github, None)).unwrap();
    let github = github::GithubClient::new(Arc::new(transport));
    let ctx = Context::background();
    let repos = scm::collect_all(ListOptions::new(1, 1), |opts| github.list(&ctx, opts))
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn stash_adapter_over_http_reports_vendor_error_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/rest/api/1.0/projects/PRJ/repos/my-repo");
            then.status(401).json_body(json!({
                "errors": [{"message": "Authentication failed. Please check your credentials and try again."}]
            }));
        })
        .await;

    let transport = HttpTransport::new(&config_for(&server, scm::Driver::Stash, None)).unwrap();
    let stash = stash::StashClient::new(Arc::new(transport));
    let err = stash
        .find(&Context::background(), "PRJ/my-repo")
        .await
        .unwrap_err();
    match err {
        ScmError::UnexpectedStatus { status, message, .. } => {
            assert_eq!(status, 401);
            assert!(message.starts_with("Authentication failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
