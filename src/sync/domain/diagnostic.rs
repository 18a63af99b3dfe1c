//! Per-user sync diagnostics.

use super::{TaskSource, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the most recent sync pass for a `(user, source)` pair.
///
/// Diagnostics are last-write-wins observability data, not a durability
/// mechanism: a pass whose task mutations succeed is a success even if the
/// diagnostic write fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDiagnostic {
    user_id: UserId,
    source: TaskSource,
    ok: bool,
    tasks_count: usize,
    message: Option<String>,
    recorded_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSyncDiagnostic {
    /// Owning user.
    pub user_id: UserId,
    /// Source the pass ran against.
    pub source: TaskSource,
    /// Whether the pass succeeded.
    pub ok: bool,
    /// Number of snapshot entries observed by the pass.
    pub tasks_count: usize,
    /// Failure detail or configuration hint, if any.
    pub message: Option<String>,
    /// When the pass outcome was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl SyncDiagnostic {
    /// Records a successful pass that observed `tasks_count` entries.
    #[must_use]
    pub const fn success(
        user_id: UserId,
        source: TaskSource,
        tasks_count: usize,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            source,
            ok: true,
            tasks_count,
            message: None,
            recorded_at,
        }
    }

    /// Records a failed pass with a human-readable reason.
    #[must_use]
    pub fn failure(
        user_id: UserId,
        source: TaskSource,
        message: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            source,
            ok: false,
            tasks_count: 0,
            message: Some(message.into()),
            recorded_at,
        }
    }

    /// Reconstructs a diagnostic from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSyncDiagnostic) -> Self {
        Self {
            user_id: data.user_id,
            source: data.source,
            ok: data.ok,
            tasks_count: data.tasks_count,
            message: data.message,
            recorded_at: data.recorded_at,
        }
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the source the pass ran against.
    #[must_use]
    pub const fn source(&self) -> TaskSource {
        self.source
    }

    /// Returns whether the pass succeeded.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.ok
    }

    /// Returns the number of snapshot entries observed by the pass.
    #[must_use]
    pub const fn tasks_count(&self) -> usize {
        self.tasks_count
    }

    /// Returns the failure detail or configuration hint, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns when the pass outcome was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
