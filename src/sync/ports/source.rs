//! Outbound port for the external snapshot source.

use crate::sync::domain::{SourceTask, TaskSource};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for snapshot source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors returned by snapshot source implementations.
///
/// A failed fetch is always explicit; adapters never substitute an empty
/// snapshot for an error, because an empty snapshot legitimately means
/// "delete everything open".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// No credentials are configured for the source.
    #[error("source is not configured: {0}")]
    Unconfigured(String),

    /// Credential acquisition or validation failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The source answered with a non-success status.
    #[error("api error (status {status}): {detail}")]
    Api {
        /// HTTP status code returned by the source.
        status: u16,
        /// Truncated response detail.
        detail: String,
    },

    /// Transport-level failure that persisted through retries.
    #[error("network error: {0}")]
    Network(String),

    /// The response payload could not be decoded.
    #[error("payload error: {0}")]
    Payload(String),
}

/// Result of asking the source to complete a task.
///
/// Completion is best-effort across the source's endpoints and never
/// fails the caller; the outcome says whether any endpoint confirmed the
/// completion and carries the accumulated failure detail when none did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// Whether the source confirmed the completion.
    pub ok: bool,
    /// Accumulated per-endpoint failure detail when unconfirmed.
    pub message: Option<String>,
}

impl CompletionOutcome {
    /// Builds a confirmed outcome.
    #[must_use]
    pub const fn confirmed() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    /// Builds an unconfirmed outcome with failure detail.
    #[must_use]
    pub fn unconfirmed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// Contract for a service that produces task snapshots.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Returns the source identity used to key mirrored records.
    fn source(&self) -> TaskSource;

    /// Returns a setup hint when the source has no usable credentials.
    ///
    /// A hint means sync passes must be skipped without mutating state.
    fn auth_hint(&self) -> Option<String>;

    /// Fetches the current snapshot of live tasks.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when credentials, transport, or payload
    /// decoding fail. An `Ok` with an empty vector is a genuine empty
    /// snapshot.
    async fn fetch_snapshot(&self) -> SourceResult<Vec<SourceTask>>;

    /// Asks the source to complete a task.
    ///
    /// Never fails; the outcome reports whether the source confirmed the
    /// completion.
    async fn complete_task(&self, project_id: &str, external_id: &str) -> CompletionOutcome;
}
