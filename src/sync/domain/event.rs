//! Append-only audit events for task lifecycle transitions.

use super::{EventId, ParseEventKindError, TaskRecord, TaskRecordId, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Kind of audit event recorded against a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    /// A snapshot observed the task for the first time.
    SyncCreate,
    /// A snapshot observed a task that was previously done or deleted.
    SyncReopen,
    /// A snapshot observed the task (batched once per pass).
    SyncSeen,
    /// The task was completed through an explicit user action.
    ManualComplete,
    /// The task was completed by an automated collaborator.
    AutoComplete,
}

impl TaskEventKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SyncCreate => "sync_create",
            Self::SyncReopen => "sync_reopen",
            Self::SyncSeen => "sync_seen",
            Self::ManualComplete => "manual_complete",
            Self::AutoComplete => "auto_complete",
        }
    }
}

impl TryFrom<&str> for TaskEventKind {
    type Error = ParseEventKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "sync_create" => Ok(Self::SyncCreate),
            "sync_reopen" => Ok(Self::SyncReopen),
            "sync_seen" => Ok(Self::SyncSeen),
            "manual_complete" => Ok(Self::ManualComplete),
            "auto_complete" => Ok(Self::AutoComplete),
            _ => Err(ParseEventKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit log entry for a task transition or observation.
///
/// Events are append-only. Replay order is the event timestamp, with
/// insertion order breaking ties within a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    id: EventId,
    user_id: UserId,
    task_id: TaskRecordId,
    kind: TaskEventKind,
    at: DateTime<Utc>,
    from_status: Option<TaskStatus>,
    to_status: Option<TaskStatus>,
    due_at: Option<DateTime<Utc>>,
    meta: Option<serde_json::Value>,
}

/// Parameter object for reconstructing a persisted audit event.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskEvent {
    /// Persisted event identifier.
    pub id: EventId,
    /// Owning user.
    pub user_id: UserId,
    /// Task the event belongs to.
    pub task_id: TaskRecordId,
    /// Persisted event kind.
    pub kind: TaskEventKind,
    /// Event timestamp.
    pub at: DateTime<Utc>,
    /// Status before the transition, if the event records one.
    pub from_status: Option<TaskStatus>,
    /// Status after the transition, if the event records one.
    pub to_status: Option<TaskStatus>,
    /// Due timestamp captured with the event, if any.
    pub due_at: Option<DateTime<Utc>>,
    /// Free-form metadata blob, if any.
    pub meta: Option<serde_json::Value>,
}

impl TaskEvent {
    /// Creates the audit entry for a first snapshot observation.
    #[must_use]
    pub fn sync_create(record: &TaskRecord, at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            user_id: record.user_id(),
            task_id: record.id(),
            kind: TaskEventKind::SyncCreate,
            at,
            from_status: None,
            to_status: Some(TaskStatus::Open),
            due_at: record.due_at(),
            meta: Some(json!({ "origin": "snapshot_sync" })),
        }
    }

    /// Creates the audit entry for a reopen transition.
    #[must_use]
    pub fn sync_reopen(record: &TaskRecord, prior: TaskStatus, at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            user_id: record.user_id(),
            task_id: record.id(),
            kind: TaskEventKind::SyncReopen,
            at,
            from_status: Some(prior),
            to_status: Some(TaskStatus::Open),
            due_at: None,
            meta: None,
        }
    }

    /// Creates the per-pass observation marker for a touched task.
    #[must_use]
    pub fn sync_seen(user_id: UserId, task_id: TaskRecordId, at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            user_id,
            task_id,
            kind: TaskEventKind::SyncSeen,
            at,
            from_status: None,
            to_status: None,
            due_at: None,
            meta: None,
        }
    }

    /// Creates the audit entry for a user-driven completion.
    #[must_use]
    pub fn manual_complete(user_id: UserId, task_id: TaskRecordId, at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            user_id,
            task_id,
            kind: TaskEventKind::ManualComplete,
            at,
            from_status: Some(TaskStatus::Open),
            to_status: Some(TaskStatus::Done),
            due_at: None,
            meta: Some(json!({ "origin": "manual" })),
        }
    }

    /// Creates the audit entry for an automated completion.
    #[must_use]
    pub fn auto_complete(user_id: UserId, task_id: TaskRecordId, at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            user_id,
            task_id,
            kind: TaskEventKind::AutoComplete,
            at,
            from_status: Some(TaskStatus::Open),
            to_status: Some(TaskStatus::Done),
            due_at: None,
            meta: Some(json!({ "origin": "auto" })),
        }
    }

    /// Reconstructs an event from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskEvent) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            task_id: data.task_id,
            kind: data.kind,
            at: data.at,
            from_status: data.from_status,
            to_status: data.to_status,
            due_at: data.due_at,
            meta: data.meta,
        }
    }

    /// Returns the event identifier.
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the task the event belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskRecordId {
        self.task_id
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> TaskEventKind {
        self.kind
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Returns the status before the transition, if recorded.
    #[must_use]
    pub const fn from_status(&self) -> Option<TaskStatus> {
        self.from_status
    }

    /// Returns the status after the transition, if recorded.
    #[must_use]
    pub const fn to_status(&self) -> Option<TaskStatus> {
        self.to_status
    }

    /// Returns the due timestamp captured with the event, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the metadata blob, if any.
    #[must_use]
    pub const fn meta(&self) -> Option<&serde_json::Value> {
        self.meta.as_ref()
    }
}
