//! Single-pass reconciliation of a snapshot against the local store.

use super::ProjectResolver;
use crate::sync::domain::{SourceTask, TaskEvent, TaskRecord, TaskRecordId, TaskSource, UserId};
use crate::sync::ports::{EventStore, ProjectStore, StoreResult, TaskStore};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;

/// Counters describing what one reconciliation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Timestamp shared by every write of the pass.
    pub pass_at: DateTime<Utc>,
    /// Records created on first observation.
    pub created: usize,
    /// Existing records refreshed by the snapshot.
    pub updated: usize,
    /// Refreshed records that were previously done or deleted.
    pub reopened: usize,
    /// Open records soft-deleted by the absence sweep.
    pub deleted: usize,
    /// Distinct records observed by the pass.
    pub seen: usize,
}

/// Applies one snapshot to one user's mirrored records.
///
/// A pass upserts every snapshot entry, soft-deletes open records the
/// snapshot no longer contains, and appends audit events for every
/// transition plus one observation marker per touched record. All writes
/// of a pass share a single timestamp.
#[derive(Clone)]
pub struct ReconciliationEngine<S, C>
where
    S: TaskStore + ProjectStore + EventStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    projects: ProjectResolver<S>,
    clock: Arc<C>,
}

impl<S, C> ReconciliationEngine<S, C>
where
    S: TaskStore + ProjectStore + EventStore,
    C: Clock + Send + Sync,
{
    /// Creates an engine over the given store and clock.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            projects: ProjectResolver::new(Arc::clone(&store)),
            store,
            clock,
        }
    }

    /// Reconciles a snapshot against the user's records.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered. Event-append failures
    /// fail the pass; an audit transition is never dropped silently.
    pub async fn reconcile(
        &self,
        user_id: UserId,
        source: TaskSource,
        snapshot: &[SourceTask],
    ) -> StoreResult<ReconcileSummary> {
        let pass_at = self.clock.utc();
        let project_ids = self.projects.resolve(user_id, snapshot, pass_at).await?;

        let mut touched: Vec<TaskRecordId> = Vec::with_capacity(snapshot.len());
        let mut touched_set: HashSet<TaskRecordId> = HashSet::with_capacity(snapshot.len());
        let mut created = 0_usize;
        let mut updated = 0_usize;
        let mut reopened = 0_usize;

        for incoming in snapshot {
            let project_id = incoming
                .project_name()
                .map(str::trim)
                .and_then(|name| project_ids.get(name))
                .copied();

            let existing = self
                .store
                .find_by_external(user_id, source, incoming.external_id())
                .await?;

            let record_id = match existing {
                None => {
                    let record =
                        TaskRecord::from_snapshot(user_id, source, incoming, project_id, pass_at);
                    self.store.insert(&record).await?;
                    self.store
                        .append(&[TaskEvent::sync_create(&record, pass_at)])
                        .await?;
                    created += 1;
                    record.id()
                }
                Some(mut record) => {
                    let prior = record.refresh_from_snapshot(incoming, project_id, pass_at);
                    self.store.update(&record).await?;
                    if let Some(prior_status) = prior {
                        self.store
                            .append(&[TaskEvent::sync_reopen(&record, prior_status, pass_at)])
                            .await?;
                        reopened += 1;
                    }
                    updated += 1;
                    record.id()
                }
            };

            if touched_set.insert(record_id) {
                touched.push(record_id);
            }
        }

        let swept = self
            .store
            .mark_unseen_deleted(user_id, source, &touched, pass_at)
            .await?;

        if !touched.is_empty() {
            let seen_events: Vec<TaskEvent> = touched
                .iter()
                .map(|task_id| TaskEvent::sync_seen(user_id, *task_id, pass_at))
                .collect();
            self.store.append(&seen_events).await?;
        }

        Ok(ReconcileSummary {
            pass_at,
            created,
            updated,
            reopened,
            deleted: swept.len(),
            seen: touched.len(),
        })
    }
}
