use std::sync::Arc;

use scm::testing::FakeTransport;
use scm::Method;
use serde_json::json;

use super::*;
use crate::args::{EventArg, StateArg, StateFilter};

fn page(all: bool) -> PageArgs {
    PageArgs {
        page: 1,
        size: 1,
        all,
    }
}

#[test]
fn client_for_selects_adapter_by_driver() {
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new());
    assert_eq!(client_for(Driver::Github, transport.clone()).driver(), Driver::Github);
    assert_eq!(client_for(Driver::Stash, transport).driver(), Driver::Stash);
}

#[test]
fn connect_defaults_github_base_url() {
    let client = connect(ClientConfig::new(Driver::Github, None)).unwrap();
    assert_eq!(client.driver(), Driver::Github);
}

#[tokio::test]
async fn repo_find_prints_repository() {
    let fake = FakeTransport::new().respond(
        Method::Get,
        "repos/octocat/hello",
        200,
        json!({"id": 7, "name": "hello", "full_name": "octocat/hello", "owner": {"login": "octocat"}}),
    );
    let client = client_for(Driver::Github, Arc::new(fake));
    let out = run(
        &client,
        &Context::background(),
        Command::Repo {
            command: RepoCommand::Find {
                repo: "octocat/hello".into(),
            },
        },
    )
    .await
    .unwrap();
    assert_eq!(out["id"], "7");
    assert_eq!(out["full_name"], "octocat/hello");
}

#[tokio::test]
async fn hook_list_all_follows_stash_pages() {
    let fake = Arc::new(
        FakeTransport::new()
            .respond(
                Method::Get,
                "rest/api/1.0/projects/PRJ/repos/r/webhooks",
                200,
                json!({"isLastPage": false, "values": [{"id": 1, "url": "https://a", "active": true}]}),
            )
            .respond(
                Method::Get,
                "rest/api/1.0/projects/PRJ/repos/r/webhooks",
                200,
                json!({"isLastPage": true, "values": [{"id": 2, "url": "https://b", "active": false}]}),
            ),
    );
    let client = client_for(Driver::Stash, fake.clone());
    let out = run(
        &client,
        &Context::background(),
        Command::Hook {
            command: HookCommand::List {
                repo: "PRJ/r".into(),
                page: page(true),
            },
        },
    )
    .await
    .unwrap();
    assert_eq!(out.as_array().unwrap().len(), 2);
    assert_eq!(fake.requests().len(), 2);
    assert_eq!(
        fake.last_request().unwrap().query,
        vec![
            ("start".to_string(), "1".to_string()),
            ("limit".to_string(), "1".to_string())
        ]
    );
}

#[tokio::test]
async fn hook_create_builds_input_from_arguments() {
    let fake = Arc::new(FakeTransport::new().respond(
        Method::Post,
        "rest/api/1.0/projects/PRJ/repos/r/webhooks",
        201,
        json!({"id": 5, "name": "ci", "url": "https://ci", "active": true, "events": ["repo:refs_changed"]}),
    ));
    let client = client_for(Driver::Stash, fake.clone());
    run(
        &client,
        &Context::background(),
        Command::Hook {
            command: HookCommand::Create {
                repo: "PRJ/r".into(),
                target: "https://ci".into(),
                name: "ci".into(),
                secret: String::new(),
                events: vec![EventArg::Tag],
                native_events: vec![],
                skip_verify: false,
            },
        },
    )
    .await
    .unwrap();
    let body = fake.last_request().unwrap().body.unwrap();
    assert_eq!(body["events"], json!(["repo:refs_changed"]));
}

#[tokio::test]
async fn status_create_on_stash_echoes_state() {
    let fake = FakeTransport::new().respond_empty(
        Method::Post,
        "rest/build-status/1.0/commits/abc",
        204,
    );
    let client = client_for(Driver::Stash, Arc::new(fake));
    let out = run(
        &client,
        &Context::background(),
        Command::Status {
            command: StatusCommand::Create {
                repo: "PRJ/r".into(),
                reference: "abc".into(),
                state: StateArg::Success,
                label: "ci".into(),
                desc: String::new(),
                target: String::new(),
            },
        },
    )
    .await
    .unwrap();
    assert_eq!(out["state"], "success");
}

#[tokio::test]
async fn unsupported_operation_surfaces_as_error() {
    let client = client_for(Driver::Stash, Arc::new(FakeTransport::new()));
    let err = run(
        &client,
        &Context::background(),
        Command::Issue {
            command: IssueCommand::List {
                repo: "PRJ/r".into(),
                filter: StateFilter {
                    open: true,
                    closed: false,
                },
                page: page(false),
            },
        },
    )
    .await
    .unwrap_err();
    let scm_err = err.downcast_ref::<scm::ScmError>().unwrap();
    assert!(scm_err.is_not_supported());
}

#[tokio::test]
async fn pr_merge_reports_status() {
    let fake = FakeTransport::new().respond(
        Method::Put,
        "repos/octocat/hello/pulls/3/merge",
        200,
        json!({"merged": true}),
    );
    let client = client_for(Driver::Github, Arc::new(fake));
    let out = run(
        &client,
        &Context::background(),
        Command::Pr {
            command: PrCommand::Merge {
                repo: "octocat/hello".into(),
                number: 3,
            },
        },
    )
    .await
    .unwrap();
    assert_eq!(out, json!({"status": 200}));
}
