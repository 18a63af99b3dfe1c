//! Storage ports for mirrored tasks, projects, audit events, and accounts.
//!
//! The four contracts share one error type so that a single store
//! implementation can back all of them. Operations that depend on the
//! current time take an explicit timestamp; stores never consult a clock,
//! which keeps one reconciliation pass observable at a single instant.

use crate::sync::domain::{
    Project, ProjectId, SyncDiagnostic, TaskEvent, TaskRecord, TaskRecordId, TaskSource,
    UserAccount, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A row violating a uniqueness constraint already exists.
    #[error("duplicate {0}")]
    Duplicate(String),

    /// The referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Builds a duplicate-row error.
    pub fn duplicate(detail: impl Into<String>) -> Self {
        Self::Duplicate(detail.into())
    }

    /// Builds a missing-row error.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Persistence contract for mirrored task records.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Finds the record mirroring the given external identity.
    ///
    /// Returns `None` when no record exists for the tuple.
    async fn find_by_external(
        &self,
        user_id: UserId,
        source: TaskSource,
        external_id: &str,
    ) -> StoreResult<Option<TaskRecord>>;

    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when the record identifier or the
    /// external identity tuple already exists.
    async fn insert(&self, record: &TaskRecord) -> StoreResult<()>;

    /// Persists the sync-managed state of an existing record.
    ///
    /// The user note is excluded: it is user-managed and never written by
    /// reconciliation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the record does not exist.
    async fn update(&self, record: &TaskRecord) -> StoreResult<()>;

    /// Soft-deletes every open record of `(user, source)` that is not in
    /// the touched set, bumping its observation timestamp to `swept_at`.
    ///
    /// Returns the identifiers of the swept records, in no particular
    /// order. An empty touched set sweeps every open record.
    async fn mark_unseen_deleted(
        &self,
        user_id: UserId,
        source: TaskSource,
        touched: &[TaskRecordId],
        swept_at: DateTime<Utc>,
    ) -> StoreResult<Vec<TaskRecordId>>;

    /// Completes every open record of `(user, source)` mirroring the given
    /// external identifier.
    ///
    /// Returns the identifiers of the completed records, in no particular
    /// order.
    async fn complete_open(
        &self,
        user_id: UserId,
        source: TaskSource,
        external_id: &str,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<Vec<TaskRecordId>>;

    /// Returns the user's open records ordered by project name (records
    /// without a project last), then by creation timestamp.
    async fn open_tasks(&self, user_id: UserId) -> StoreResult<Vec<TaskRecord>>;
}

/// Persistence contract for auto-provisioned projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Ensures an active project exists for `(user, name)` and returns its
    /// identifier.
    ///
    /// An existing project is forced back to active; a missing one is
    /// created. Callers pass snapshot-derived names that are already
    /// trimmed and non-empty; stores may reject blank names as persistence
    /// errors.
    async fn upsert_active(
        &self,
        user_id: UserId,
        name: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<ProjectId>;

    /// Returns the user's projects ordered by name.
    async fn projects(&self, user_id: UserId) -> StoreResult<Vec<Project>>;
}

/// Persistence contract for the append-only audit log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch of events, preserving the slice order.
    async fn append(&self, events: &[TaskEvent]) -> StoreResult<()>;

    /// Returns a task's events in replay order: timestamp ascending with
    /// insertion order breaking ties.
    async fn events_for_task(&self, task_id: TaskRecordId) -> StoreResult<Vec<TaskEvent>>;
}

/// Persistence contract for user accounts and sync diagnostics.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns the identifier of the account with the given handle,
    /// creating the account when it does not exist.
    async fn ensure_user(&self, handle: &str, at: DateTime<Utc>) -> StoreResult<UserId>;

    /// Returns every known account, oldest first.
    async fn list_users(&self) -> StoreResult<Vec<UserAccount>>;

    /// Records the outcome of a sync pass, replacing any previous outcome
    /// for the same `(user, source)` pair.
    async fn record_diagnostic(&self, diagnostic: &SyncDiagnostic) -> StoreResult<()>;

    /// Returns the most recently recorded pass outcome for the pair.
    async fn diagnostic(
        &self,
        user_id: UserId,
        source: TaskSource,
    ) -> StoreResult<Option<SyncDiagnostic>>;
}
