//! Error and retry-policy types shared by every provider adapter.
//!
//! [`ScmError`] is the single error type returned by every capability method.
//! Callers distinguish the four failure classes by variant:
//!
//! | Class | Variant |
//! |-------|---------|
//! | provider has no equivalent operation | [`ScmError::NotSupported`] |
//! | network / transport failure | [`ScmError::Transport`] |
//! | status the adapter cannot interpret | [`ScmError::UnexpectedStatus`], [`ScmError::NotFound`] |
//! | vendor JSON did not match the wire struct | [`ScmError::Decode`] |
//!
//! A request that succeeds with no results is `Ok` with an empty collection,
//! never an error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Driver, Method};

/// Boxed error used to carry the underlying cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// This crate never retries on its own. The policy lets an external retry
/// layer decide without matching on every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt, when the provider said so.
        after: Option<Duration>,
    },
    /// Retrying will produce the same outcome.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by capability methods, the transport port and configuration.
#[derive(Debug, Error)]
pub enum ScmError {
    /// The provider has no equivalent of the requested operation.
    ///
    /// Returned, never panicked. Use [`ScmError::is_not_supported`] to probe
    /// capabilities without type-testing the adapter.
    #[error("{operation} is not supported by the {driver} driver")]
    NotSupported {
        /// Provider that rejected the call.
        driver: Driver,
        /// Capability method name, e.g. `"issues.lock"`.
        operation: &'static str,
    },

    /// The request never produced an HTTP response.
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable summary.
        message: String,
        /// Underlying cause, when available.
        #[source]
        source: Option<BoxError>,
    },

    /// The provider answered 404 for the requested resource.
    #[error("resource not found: {path}")]
    NotFound {
        /// Request path that produced the 404.
        path: String,
    },

    /// The provider answered with a status the adapter does not interpret.
    #[error("unexpected status {status} from {method} {path}: {message}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Request method.
        method: Method,
        /// Request path.
        path: String,
        /// Provider error message extracted from the body, or empty.
        message: String,
        /// Delay requested through `Retry-After`, if present.
        retry_after: Option<Duration>,
    },

    /// The response body did not match the expected wire shape.
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        /// Request path whose body failed to decode.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized.
    #[error("failed to encode request body for {path}: {source}")]
    Encode {
        /// Request path whose body failed to encode.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The caller's [`crate::Context`] was canceled before the response arrived.
    #[error("request canceled")]
    Canceled,

    /// The caller's [`crate::Context`] deadline passed before the response arrived.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A repository identifier was not in `namespace/name` form.
    #[error("invalid repository identifier '{value}': expected 'namespace/name'")]
    InvalidRepository {
        /// The rejected identifier.
        value: String,
    },

    /// Client configuration is invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ScmError {
    /// Builds the not-supported sentinel for `operation` on `driver`.
    pub fn not_supported(driver: Driver, operation: &'static str) -> Self {
        Self::NotSupported { driver, operation }
    }

    /// Builds a [`ScmError::Transport`] from any error type.
    pub fn transport(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns `true` for the not-supported sentinel.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }

    /// Returns `true` when the request did not complete at all: network
    /// failure, cancellation or an expired deadline.
    ///
    /// Anything else means the provider answered, which heuristic probes
    /// treat as a privilege signal.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Canceled | Self::DeadlineExceeded
        )
    }

    /// HTTP status carried by this error, if the provider answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classifies the error for an external retry layer.
    ///
    /// - Transport failures and deadline expiry are retryable.
    /// - `429` and `5xx` statuses are retryable after any `Retry-After` delay.
    /// - Everything else, including cancellation, is not.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Transport { .. } | Self::DeadlineExceeded => {
                RetryPolicy::Retryable { after: None }
            }
            Self::UnexpectedStatus {
                status,
                retry_after,
                ..
            } if *status == 429 || *status >= 500 => RetryPolicy::Retryable {
                after: *retry_after,
            },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
