use std::time::Duration;

use super::*;

#[test]
fn not_supported_is_distinguishable() {
    let err = ScmError::not_supported(Driver::Stash, "issues.lock");
    assert!(err.is_not_supported());
    assert!(!err.is_transport_failure());
    assert_eq!(
        err.to_string(),
        "issues.lock is not supported by the stash driver"
    );
}

#[test]
fn transport_failures_are_classified() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
    assert!(ScmError::transport("send failed", io).is_transport_failure());
    assert!(ScmError::Canceled.is_transport_failure());
    assert!(ScmError::DeadlineExceeded.is_transport_failure());
    assert!(!ScmError::NotFound { path: "x".into() }.is_transport_failure());
}

#[test]
fn status_is_exposed_for_provider_answers() {
    assert_eq!(ScmError::NotFound { path: "x".into() }.status(), Some(404));
    assert_eq!(ScmError::Canceled.status(), None);
}

#[test]
fn server_errors_are_retryable_after_delay() {
    let err = ScmError::UnexpectedStatus {
        status: 503,
        method: Method::Get,
        path: "repos/o/r".into(),
        message: String::new(),
        retry_after: Some(Duration::from_secs(5)),
    };
    assert_eq!(
        err.retry_policy(),
        RetryPolicy::Retryable {
            after: Some(Duration::from_secs(5))
        }
    );
}

#[test]
fn client_errors_are_not_retryable() {
    let err = ScmError::UnexpectedStatus {
        status: 422,
        method: Method::Post,
        path: "repos/o/r/hooks".into(),
        message: "Validation Failed".into(),
        retry_after: None,
    };
    assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
    assert_eq!(ScmError::Canceled.retry_policy(), RetryPolicy::NonRetryable);
    assert_eq!(
        ScmError::not_supported(Driver::Github, "x").retry_policy(),
        RetryPolicy::NonRetryable
    );
}
