//! Error types for calls into external collaborators.
//!
//! Follows the What/Why/Fix message pattern used across the project. The
//! pipeline decides whether a [`CollaboratorError`] is fatal; collaborators
//! never decide that themselves.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to an external service.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    /// The request could not be sent or the connection failed
    #[error("{service} request failed: {reason}\n  Suggestion: Check your network connection and the service URL")]
    Transport {
        /// Service name (e.g. "grobid", "crossref")
        service: String,
        /// Underlying transport failure
        reason: String,
    },

    /// The service answered with a non-success status
    #[error("{service} returned HTTP {status}: {reason}\n  Suggestion: {suggestion}")]
    Status {
        /// Service name
        service: String,
        /// HTTP status code
        status: u16,
        /// Why the status matters
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The response body could not be interpreted
    #[error("unexpected {service} response: {reason}\n  Suggestion: The service API may have changed; retry later")]
    InvalidResponse {
        /// Service name
        service: String,
        /// What was wrong with the body
        reason: String,
    },

    /// The call did not finish within the configured bound
    #[error("{service} call timed out after {}s\n  Suggestion: Increase call_timeout_secs or retry later", .elapsed.as_secs())]
    Timeout {
        /// Service name
        service: String,
        /// Configured bound
        elapsed: Duration,
    },

    /// Client construction or configuration failed
    #[error("{service} client unavailable: {reason}\n  Suggestion: Check the configured service URL and credentials")]
    Setup {
        /// Service name
        service: String,
        /// Why construction failed
        reason: String,
    },
}

impl CollaboratorError {
    /// Creates a `Transport` error.
    #[must_use]
    pub fn transport(service: &str, reason: impl ToString) -> Self {
        Self::Transport {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Status` error with a suggestion derived from the status class.
    #[must_use]
    pub fn status(service: &str, status: u16) -> Self {
        let (reason, suggestion) = match status {
            404 => ("resource not found", "Check the identifier or endpoint path"),
            429 => ("rate limit exceeded", "Wait a few seconds and try again"),
            401 | 403 => ("access denied", "Check the configured API token"),
            s if s >= 500 => ("service unavailable", "Try again later"),
            _ => ("request rejected", "Check the request parameters"),
        };
        Self::Status {
            service: service.to_string(),
            status,
            reason: reason.to_string(),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates an `InvalidResponse` error.
    #[must_use]
    pub fn invalid_response(service: &str, reason: impl ToString) -> Self {
        Self::InvalidResponse {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(service: &str, elapsed: Duration) -> Self {
        Self::Timeout {
            service: service.to_string(),
            elapsed,
        }
    }

    /// Creates a `Setup` error.
    #[must_use]
    pub fn setup(service: &str, reason: impl ToString) -> Self {
        Self::Setup {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Runs `future` under `limit`, mapping an elapsed timer to [`CollaboratorError::Timeout`].
///
/// # Errors
///
/// Returns the future's own error, or `Timeout` if `limit` elapses first.
pub async fn with_timeout<T, F>(service: &str, limit: Duration, future: F) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::timeout(service, limit)),
    }
}
