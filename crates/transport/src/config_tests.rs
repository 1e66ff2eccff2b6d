use yare::parameterized;

use super::*;

#[test]
fn parses_full_document() {
    let config = ClientConfig::from_toml(
        r#"
            driver = "stash"
            base_url = "https://stash.example.com/"
            token = "secret"
            user_agent = "tests"
            timeout_secs = 5
        "#,
    )
    .unwrap();
    assert_eq!(config.driver, Driver::Stash);
    assert_eq!(config.base_url.as_deref(), Some("https://stash.example.com/"));
    assert_eq!(config.token.as_deref(), Some("secret"));
    assert_eq!(config.user_agent, "tests");
    assert_eq!(config.timeout(), Duration::from_secs(5));
}

#[test]
fn github_defaults_fill_optional_fields() {
    let config = ClientConfig::from_toml(r#"driver = "github""#).unwrap();
    assert_eq!(config, ClientConfig::new(Driver::Github, None));
    assert_eq!(config.timeout_secs, 30);
    assert!(config.user_agent.starts_with("scm-bridge/"));
}

#[test]
fn bitbucketserver_is_an_alias_for_stash() {
    let config = ClientConfig::from_toml(
        r#"
            driver = "bitbucketserver"
            base_url = "https://stash.example.com/"
        "#,
    )
    .unwrap();
    assert_eq!(config.driver, Driver::Stash);
}

#[parameterized(
    stash_without_base_url = { r#"driver = "stash""# },
    bad_url = { "driver = \"github\"\nbase_url = \"not a url\"" },
    zero_timeout = { "driver = \"github\"\ntimeout_secs = 0" },
    unknown_driver = { r#"driver = "gitlab""# },
    missing_driver = { r#"base_url = "https://example.com/""# },
)]
fn rejects_invalid_documents(content: &str) {
    assert!(ClientConfig::from_toml(content).is_err());
}

#[test]
fn missing_base_url_names_driver() {
    let err = ClientConfig::from_toml(r#"driver = "stash""#).unwrap_err();
    assert_eq!(err.to_string(), "base_url is required for the stash driver");
}

#[parameterized(
    overrides = { Some("file"), Some("env"), Some("env") },
    fills_missing = { None, Some("env"), Some("env") },
    empty_is_ignored = { Some("file"), Some(""), Some("file") },
    unset_is_ignored = { Some("file"), None, Some("file") },
)]
fn token_override(file: Option<&str>, env: Option<&str>, expected: Option<&str>) {
    let mut config = ClientConfig::new(Driver::Github, None);
    config.token = file.map(str::to_string);
    let config = config.with_token_override(env.map(str::to_string));
    assert_eq!(config.token.as_deref(), expected);
}

#[test]
fn load_reports_missing_file() {
    let err = ClientConfig::load(Path::new("/nonexistent/scm/config.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
