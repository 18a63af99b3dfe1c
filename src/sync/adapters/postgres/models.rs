//! Diesel row models for snapshot reconciliation persistence.

use super::schema::{projects, sync_states, task_events, tasks, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for user accounts.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// External chat handle.
    pub handle: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for user accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// External chat handle.
    pub handle: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for projects.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for projects.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for mirrored task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRecordRow {
    /// Internal record identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Source service the record mirrors.
    pub source: String,
    /// Identifier assigned by the source service.
    pub external_id: String,
    /// Task title.
    pub title: String,
    /// User-managed note.
    pub note: Option<String>,
    /// Linked project identifier.
    pub project_id: Option<uuid::Uuid>,
    /// Project display name captured at observation time.
    pub project_name: Option<String>,
    /// Mirror lifecycle status.
    pub status: String,
    /// Source-side priority.
    pub priority: Option<i32>,
    /// Due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Source-side creation timestamp.
    pub created_at: DateTime<Utc>,
    /// First observation timestamp.
    pub first_seen_at: DateTime<Utc>,
    /// Most recent observation timestamp.
    pub last_seen_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert model for mirrored task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRecordRow {
    /// Internal record identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Source service the record mirrors.
    pub source: String,
    /// Identifier assigned by the source service.
    pub external_id: String,
    /// Task title.
    pub title: String,
    /// User-managed note.
    pub note: Option<String>,
    /// Linked project identifier.
    pub project_id: Option<uuid::Uuid>,
    /// Project display name captured at observation time.
    pub project_name: Option<String>,
    /// Mirror lifecycle status.
    pub status: String,
    /// Source-side priority.
    pub priority: Option<i32>,
    /// Due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Source-side creation timestamp.
    pub created_at: DateTime<Utc>,
    /// First observation timestamp.
    pub first_seen_at: DateTime<Utc>,
    /// Most recent observation timestamp.
    pub last_seen_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Query result row for audit events.
///
/// The insertion sequence stays in the database; replay queries order by
/// it without selecting it.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Task the event belongs to.
    pub task_id: uuid::Uuid,
    /// Event kind.
    pub kind: String,
    /// Event timestamp.
    pub at: DateTime<Utc>,
    /// Status before the transition.
    pub from_status: Option<String>,
    /// Status after the transition.
    pub to_status: Option<String>,
    /// Due timestamp captured with the event.
    pub due_at: Option<DateTime<Utc>>,
    /// Structured event payload.
    pub meta: Option<Value>,
}

/// Insert model for audit events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_events)]
pub struct NewTaskEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Task the event belongs to.
    pub task_id: uuid::Uuid,
    /// Event kind.
    pub kind: String,
    /// Event timestamp.
    pub at: DateTime<Utc>,
    /// Status before the transition.
    pub from_status: Option<String>,
    /// Status after the transition.
    pub to_status: Option<String>,
    /// Due timestamp captured with the event.
    pub due_at: Option<DateTime<Utc>>,
    /// Structured event payload.
    pub meta: Option<Value>,
}

/// Query result row for sync pass outcomes.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sync_states)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SyncStateRow {
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Source the pass ran against.
    pub source: String,
    /// Whether the pass succeeded.
    pub ok: bool,
    /// Number of snapshot entries observed.
    pub tasks_count: i32,
    /// Failure detail or configuration hint.
    pub message: Option<String>,
    /// When the outcome was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for sync pass outcomes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sync_states)]
pub struct NewSyncStateRow {
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Source the pass ran against.
    pub source: String,
    /// Whether the pass succeeded.
    pub ok: bool,
    /// Number of snapshot entries observed.
    pub tasks_count: i32,
    /// Failure detail or configuration hint.
    pub message: Option<String>,
    /// When the outcome was recorded.
    pub recorded_at: DateTime<Utc>,
}
