use super::*;
use yare::parameterized;

#[parameterized(
    owner_and_name = { "octocat/hello-world", "octocat", "hello-world" },
    name_only = { "hello-world", "", "hello-world" },
    nested_path = { "group/sub/repo", "group", "sub/repo" },
    trailing_slash = { "octocat/", "octocat", "" },
    empty = { "", "", "" },
)]
fn split_at_first_slash(input: &str, namespace: &str, name: &str) {
    assert_eq!(split(input), (namespace, name));
}

#[test]
fn join_reverses_split() {
    assert_eq!(join("PRJ", "repo"), "PRJ/repo");
    assert_eq!(join("", "repo"), "repo");
}

#[test]
fn repo_ref_parses_namespace_and_name() {
    let repo = RepoRef::parse("PRJ/my-repo").unwrap();
    assert_eq!(repo.namespace(), "PRJ");
    assert_eq!(repo.name(), "my-repo");
    assert_eq!(repo.to_string(), "PRJ/my-repo");
}

#[parameterized(
    no_slash = { "repo" },
    empty_namespace = { "/repo" },
    empty_name = { "PRJ/" },
)]
fn repo_ref_rejects_incomplete_identifiers(input: &str) {
    let err = RepoRef::parse(input).unwrap_err();
    assert!(matches!(err, ScmError::InvalidRepository { value } if value == input));
}

#[test]
fn string_ids_reject_empty_and_accept_integers() {
    assert!(HookId::new("").is_none());
    assert_eq!(HookId::from(42).as_str(), "42");
    assert_eq!(RepoId::new("abc").unwrap().to_string(), "abc");
}
