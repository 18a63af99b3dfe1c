//! Mirrored task record aggregate and its lifecycle transitions.

use super::{ProjectId, SourceTask, TaskRecordId, TaskSource, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locally mirrored record of a unit of work at an external source.
///
/// The external identity of a record is the `(user, source, external id)`
/// tuple; stores enforce at most one record per tuple. Lifecycle methods
/// take the pass timestamp explicitly so that every record touched by one
/// reconciliation pass carries the same observation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskRecordId,
    user_id: UserId,
    source: TaskSource,
    external_id: String,
    title: String,
    note: Option<String>,
    project_id: Option<ProjectId>,
    project_name: Option<String>,
    status: TaskStatus,
    priority: Option<i32>,
    due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    first_seen_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskRecord {
    /// Persisted record identifier.
    pub id: TaskRecordId,
    /// Owning user.
    pub user_id: UserId,
    /// Source service the record mirrors.
    pub source: TaskSource,
    /// Identifier assigned by the source service.
    pub external_id: String,
    /// Persisted title.
    pub title: String,
    /// Persisted free-text note, if any.
    pub note: Option<String>,
    /// Linked project identifier, if any.
    pub project_id: Option<ProjectId>,
    /// Project display name captured at observation time, if any.
    pub project_name: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted source priority, if any.
    pub priority: Option<i32>,
    /// Persisted due timestamp, if any.
    pub due_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// First observation timestamp.
    pub first_seen_at: DateTime<Utc>,
    /// Latest observation timestamp.
    pub last_seen_at: DateTime<Utc>,
    /// Completion timestamp, if the task was ever completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Creates an open record from a snapshot entry first observed at
    /// `observed_at`.
    ///
    /// The creation timestamp prefers the source-side creation time and
    /// falls back to the observation time when the source did not provide
    /// one.
    #[must_use]
    pub fn from_snapshot(
        user_id: UserId,
        source: TaskSource,
        incoming: &SourceTask,
        project_id: Option<ProjectId>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskRecordId::new(),
            user_id,
            source,
            external_id: incoming.external_id().to_owned(),
            title: incoming.title().to_owned(),
            note: None,
            project_id,
            project_name: incoming.project_name().map(ToOwned::to_owned),
            status: TaskStatus::Open,
            priority: incoming.priority(),
            due_at: incoming.due_at(),
            created_at: incoming.created_at().unwrap_or(observed_at),
            first_seen_at: observed_at,
            last_seen_at: observed_at,
            completed_at: None,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskRecord) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            source: data.source,
            external_id: data.external_id,
            title: data.title,
            note: data.note,
            project_id: data.project_id,
            project_name: data.project_name,
            status: data.status,
            priority: data.priority,
            due_at: data.due_at,
            created_at: data.created_at,
            first_seen_at: data.first_seen_at,
            last_seen_at: data.last_seen_at,
            completed_at: data.completed_at,
        }
    }

    /// Refreshes the record from a later snapshot observation.
    ///
    /// Updates the snapshot-owned fields, forces the status back to
    /// [`TaskStatus::Open`], and bumps the observation timestamp. The
    /// creation and first-observation timestamps are immutable, and a prior
    /// completion timestamp is kept as audit data.
    ///
    /// Returns the prior status when the record was not open, signalling a
    /// reopen transition to the caller.
    pub fn refresh_from_snapshot(
        &mut self,
        incoming: &SourceTask,
        project_id: Option<ProjectId>,
        observed_at: DateTime<Utc>,
    ) -> Option<TaskStatus> {
        let prior = self.status;
        self.title = incoming.title().to_owned();
        self.project_id = project_id;
        self.project_name = incoming.project_name().map(ToOwned::to_owned);
        self.due_at = incoming.due_at();
        self.priority = incoming.priority();
        self.status = TaskStatus::Open;
        self.last_seen_at = observed_at;
        (prior != TaskStatus::Open).then_some(prior)
    }

    /// Soft-deletes a record that was absent from the latest snapshot.
    ///
    /// The sweep counts as an observation of the absence, so the
    /// observation timestamp is bumped as well.
    pub fn mark_deleted(&mut self, swept_at: DateTime<Utc>) {
        self.status = TaskStatus::Deleted;
        self.last_seen_at = swept_at;
    }

    /// Completes the record.
    pub fn complete(&mut self, completed_at: DateTime<Utc>) {
        self.status = TaskStatus::Done;
        self.completed_at = Some(completed_at);
        self.last_seen_at = completed_at;
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> TaskRecordId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the source service.
    #[must_use]
    pub const fn source(&self) -> TaskSource {
        self.source
    }

    /// Returns the identifier assigned by the source service.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the free-text note, if any.
    ///
    /// Notes are user-managed and never touched by reconciliation.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns the linked project identifier, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the project display name, if any.
    #[must_use]
    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the source priority, if any.
    #[must_use]
    pub const fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// Returns the due timestamp, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the first observation timestamp.
    #[must_use]
    pub const fn first_seen_at(&self) -> DateTime<Utc> {
        self.first_seen_at
    }

    /// Returns the latest observation timestamp.
    #[must_use]
    pub const fn last_seen_at(&self) -> DateTime<Utc> {
        self.last_seen_at
    }

    /// Returns the completion timestamp, if the task was ever completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}
