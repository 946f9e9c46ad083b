//! Error types for provider access and reconciliation.

use std::time::Duration;
use thiserror::Error;

use crate::config::DEFAULT_REQUEUE_AFTER_SECS;

/// Main error type of the crate.
///
/// Validation problems are not errors; they are returned as a
/// [`crate::validation::ErrorList`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The provider reports the resource does not exist.
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    /// Non-success response from the provider.
    #[error("unexpected {kind} status code: {status}: {message}")]
    Provider {
        kind: &'static str,
        status: u16,
        message: String,
        /// `Retry-After` hint sent with the response.
        retry_after: Option<Duration>,
    },

    /// Transport level failure talking to the provider.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a payload that does not decode.
    #[error("cannot decode {kind} at path {path}: {message}")]
    Decode {
        kind: &'static str,
        path: String,
        message: String,
    },

    /// Reading or writing a local file failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Token acquisition failed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Missing or invalid local configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An asynchronous provider operation finished unsuccessfully.
    #[error("operation ended with status {status}: {message}")]
    OperationFailed { status: String, message: String },

    /// A resource exists but the provider did not report its ID.
    #[error("{kind} exists, but id is unknown. (rg:{resource_group} name:{name})")]
    MissingId {
        kind: &'static str,
        resource_group: String,
        name: String,
    },

    /// A transient failure; the caller should retry after `requeue_after`.
    #[error("{source} (retry after {requeue_after:?})")]
    Retryable {
        #[source]
        source: Box<Error>,
        requeue_after: Duration,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for failures worth retrying: throttling, server side errors,
    /// and transport timeouts or connection failures.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Provider { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::Retryable { .. } => true,
            _ => false,
        }
    }

    /// Wrap a transient failure with a suggested backoff (the provider's
    /// `Retry-After` hint, else the default requeue interval). Other errors
    /// are returned unchanged.
    pub fn into_retryable(self) -> Error {
        if !self.is_transient() || matches!(self, Error::Retryable { .. }) {
            return self;
        }
        let hint = match &self {
            Error::Provider { retry_after, .. } => *retry_after,
            _ => None,
        };
        Error::Retryable {
            source: Box::new(self),
            requeue_after: hint.unwrap_or(Duration::from_secs(DEFAULT_REQUEUE_AFTER_SECS)),
        }
    }

    /// Suggested requeue interval for retryable errors.
    pub fn requeue_after(&self) -> Option<Duration> {
        match self {
            Error::Retryable { requeue_after, .. } => Some(*requeue_after),
            _ => None,
        }
    }
}
