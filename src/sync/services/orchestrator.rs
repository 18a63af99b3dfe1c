//! Pass orchestration: per-user syncs, fan-out, and completion flows.

use super::{ReconcileSummary, ReconciliationEngine};
use crate::sync::domain::{SourceTask, SyncDiagnostic, TaskEvent, TaskRecord, TaskSource, UserId};
use crate::sync::ports::{
    AccountStore, EventStore, ProjectStore, SnapshotSource, StoreResult, TaskStore,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of a sync pass for one user.
///
/// Passes never fail the caller; every outcome is a report, and the same
/// outcome is recorded as the user's diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSyncReport {
    /// The user the pass ran for.
    pub user_id: UserId,
    /// Whether the pass fetched and reconciled successfully.
    pub ok: bool,
    /// Number of snapshot entries observed.
    pub tasks_count: usize,
    /// Credential setup hint when the source is unconfigured.
    pub auth_hint: Option<String>,
    /// Failure detail when the pass did not succeed.
    pub message: Option<String>,
}

/// Outcome of a sync pass fanned out to every known user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSyncReport {
    /// Whether the snapshot was fetched and the fan-out ran.
    pub ok: bool,
    /// Users whose reconciliation succeeded.
    pub users_synced: usize,
    /// Users whose reconciliation failed.
    pub users_failed: usize,
    /// Number of snapshot entries observed.
    pub tasks_count: usize,
    /// Credential setup hint when the source is unconfigured.
    pub auth_hint: Option<String>,
    /// Failure detail when the batch did not run.
    pub message: Option<String>,
}

impl BatchSyncReport {
    fn skipped(auth_hint: Option<String>, message: Option<String>) -> Self {
        Self {
            ok: false,
            users_synced: 0,
            users_failed: 0,
            tasks_count: 0,
            auth_hint,
            message,
        }
    }
}

/// Outcome of completing a task at the source and locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletionReport {
    /// Whether the completion is confirmed at the source and bookkept
    /// locally.
    pub ok: bool,
    /// Local open records transitioned to done.
    pub tasks_updated: usize,
    /// Failure detail when unconfirmed or partially applied.
    pub message: Option<String>,
}

/// Coordinates snapshot fetching, reconciliation, diagnostics, and
/// completion against one snapshot source.
#[derive(Clone)]
pub struct SyncOrchestrator<S, Src, C>
where
    S: TaskStore + ProjectStore + EventStore + AccountStore,
    Src: SnapshotSource,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    source: Arc<Src>,
    engine: ReconciliationEngine<S, C>,
    clock: Arc<C>,
}

impl<S, Src, C> SyncOrchestrator<S, Src, C>
where
    S: TaskStore + ProjectStore + EventStore + AccountStore,
    Src: SnapshotSource,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator over the given store, source, and clock.
    #[must_use]
    pub fn new(store: Arc<S>, source: Arc<Src>, clock: Arc<C>) -> Self {
        Self {
            engine: ReconciliationEngine::new(Arc::clone(&store), Arc::clone(&clock)),
            store,
            source,
            clock,
        }
    }

    /// Returns the identifier of the account with the given handle,
    /// creating the account when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the store error when the lookup or insert fails.
    pub async fn ensure_user(&self, handle: &str) -> StoreResult<UserId> {
        self.store.ensure_user(handle, self.clock.utc()).await
    }

    /// Runs a sync pass for one user.
    ///
    /// An unconfigured source and a failed fetch both skip reconciliation
    /// entirely; nothing is swept on a failed fetch. Every outcome is
    /// recorded as the user's diagnostic.
    pub async fn sync_user(&self, user_id: UserId) -> UserSyncReport {
        if let Some(hint) = self.source.auth_hint() {
            self.record_failure(user_id, hint.clone()).await;
            return UserSyncReport {
                user_id,
                ok: false,
                tasks_count: 0,
                auth_hint: Some(hint),
                message: None,
            };
        }

        let snapshot = match self.source.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(user = %user_id, error = %err, "snapshot fetch failed");
                let detail = err.to_string();
                self.record_failure(user_id, detail.clone()).await;
                return UserSyncReport {
                    user_id,
                    ok: false,
                    tasks_count: 0,
                    auth_hint: None,
                    message: Some(detail),
                };
            }
        };

        match self.reconcile_user(user_id, &snapshot).await {
            Ok(()) => UserSyncReport {
                user_id,
                ok: true,
                tasks_count: snapshot.len(),
                auth_hint: None,
                message: None,
            },
            Err(detail) => UserSyncReport {
                user_id,
                ok: false,
                tasks_count: 0,
                auth_hint: None,
                message: Some(detail),
            },
        }
    }

    /// Runs one sync pass fanned out to every known user.
    ///
    /// The snapshot is fetched once and reconciled per user sequentially.
    /// One user's failure is recorded in that user's diagnostic and
    /// counted, and never aborts the rest of the batch. A failed fetch
    /// fails the whole batch without touching any user's records.
    pub async fn sync_all_users(&self) -> BatchSyncReport {
        if let Some(hint) = self.source.auth_hint() {
            return BatchSyncReport::skipped(Some(hint), None);
        }

        let users = match self.store.list_users().await {
            Ok(users) => users,
            Err(err) => {
                error!(error = %err, "listing users for batch sync failed");
                return BatchSyncReport::skipped(None, Some(err.to_string()));
            }
        };

        if users.is_empty() {
            return BatchSyncReport {
                ok: true,
                users_synced: 0,
                users_failed: 0,
                tasks_count: 0,
                auth_hint: None,
                message: None,
            };
        }

        let snapshot = match self.source.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(error = %err, "snapshot fetch for batch sync failed");
                return BatchSyncReport::skipped(None, Some(err.to_string()));
            }
        };

        let mut users_synced = 0_usize;
        let mut users_failed = 0_usize;
        for user in &users {
            match self.reconcile_user(user.id(), &snapshot).await {
                Ok(()) => users_synced += 1,
                Err(_) => users_failed += 1,
            }
        }

        info!(
            users_synced,
            users_failed,
            tasks_count = snapshot.len(),
            "batch sync pass finished"
        );

        BatchSyncReport {
            ok: true,
            users_synced,
            users_failed,
            tasks_count: snapshot.len(),
            auth_hint: None,
            message: None,
        }
    }

    /// Completes a task at the source, then bookkeeps the local records.
    ///
    /// Local records transition only after the source confirms; a
    /// confirmed completion whose local bookkeeping fails is reported as
    /// not ok with a distinct message.
    pub async fn complete_task(
        &self,
        user_id: UserId,
        project_id: &str,
        external_id: &str,
    ) -> TaskCompletionReport {
        let outcome = self.source.complete_task(project_id, external_id).await;
        if !outcome.ok {
            return TaskCompletionReport {
                ok: false,
                tasks_updated: 0,
                message: outcome.message,
            };
        }

        let now = self.clock.utc();
        let completed = match self
            .store
            .complete_open(user_id, self.source.source(), external_id, now)
            .await
        {
            Ok(ids) => ids,
            Err(err) => {
                error!(user = %user_id, external_id, error = %err, "local completion bookkeeping failed");
                return TaskCompletionReport {
                    ok: false,
                    tasks_updated: 0,
                    message: Some(format!(
                        "completed at source, but local bookkeeping failed: {err}"
                    )),
                };
            }
        };

        let events: Vec<TaskEvent> = completed
            .iter()
            .map(|task_id| TaskEvent::manual_complete(user_id, *task_id, now))
            .collect();
        if !events.is_empty()
            && let Err(err) = self.store.append(&events).await
        {
            error!(user = %user_id, external_id, error = %err, "completion audit append failed");
            return TaskCompletionReport {
                ok: false,
                tasks_updated: completed.len(),
                message: Some(format!(
                    "completed at source, but audit bookkeeping failed: {err}"
                )),
            };
        }

        TaskCompletionReport {
            ok: true,
            tasks_updated: completed.len(),
            message: None,
        }
    }

    /// Returns the user's open records ordered by project name, then by
    /// creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns the store error when the query fails.
    pub async fn open_tasks(&self, user_id: UserId) -> StoreResult<Vec<TaskRecord>> {
        self.store.open_tasks(user_id).await
    }

    /// Returns the recorded outcome of the user's most recent sync pass.
    ///
    /// # Errors
    ///
    /// Returns the store error when the query fails.
    pub async fn last_sync(&self, user_id: UserId) -> StoreResult<Option<SyncDiagnostic>> {
        self.store.diagnostic(user_id, self.source.source()).await
    }

    /// Reconciles a fetched snapshot for one user and records the
    /// diagnostic either way. Returns the failure detail on error.
    async fn reconcile_user(
        &self,
        user_id: UserId,
        snapshot: &[SourceTask],
    ) -> Result<(), String> {
        match self
            .engine
            .reconcile(user_id, self.source.source(), snapshot)
            .await
        {
            Ok(summary) => {
                log_pass(user_id, &summary);
                let diagnostic = SyncDiagnostic::success(
                    user_id,
                    self.source.source(),
                    snapshot.len(),
                    self.clock.utc(),
                );
                self.record(&diagnostic).await;
                Ok(())
            }
            Err(err) => {
                error!(user = %user_id, error = %err, "reconciliation pass failed");
                let detail = err.to_string();
                self.record_failure(user_id, detail.clone()).await;
                Err(detail)
            }
        }
    }

    async fn record_failure(&self, user_id: UserId, message: String) {
        let diagnostic =
            SyncDiagnostic::failure(user_id, self.source.source(), message, self.clock.utc());
        self.record(&diagnostic).await;
    }

    /// Writes a diagnostic, logging instead of failing when the write is
    /// rejected. Diagnostics are observability, not durability.
    async fn record(&self, diagnostic: &SyncDiagnostic) {
        if let Err(err) = self.store.record_diagnostic(diagnostic).await {
            warn!(user = %diagnostic.user_id(), error = %err, "recording sync diagnostic failed");
        }
    }

    /// Returns the source identity this orchestrator syncs against.
    #[must_use]
    pub fn source(&self) -> TaskSource {
        self.source.source()
    }
}

fn log_pass(user_id: UserId, summary: &ReconcileSummary) {
    info!(
        user = %user_id,
        created = summary.created,
        updated = summary.updated,
        reopened = summary.reopened,
        deleted = summary.deleted,
        seen = summary.seen,
        "reconciliation pass finished"
    );
}
