//! Project auto-provisioning for snapshot passes.

use crate::sync::domain::{ProjectId, SourceTask, UserId};
use crate::sync::ports::{ProjectStore, StoreResult};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Resolves the project names of a snapshot into local project ids.
///
/// Runs once per pass, before any task write, so that every task row can
/// link the project it names.
#[derive(Clone)]
pub struct ProjectResolver<S>
where
    S: ProjectStore,
{
    store: Arc<S>,
}

impl<S> ProjectResolver<S>
where
    S: ProjectStore,
{
    /// Creates a resolver over the given project store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Upserts one active project per distinct project name in the
    /// snapshot and returns the name-to-id table.
    ///
    /// Names are trimmed and blank names skipped; duplicates collapse to a
    /// single upsert in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered; the pass must not
    /// proceed with an incomplete table.
    pub async fn resolve(
        &self,
        user_id: UserId,
        snapshot: &[SourceTask],
        at: DateTime<Utc>,
    ) -> StoreResult<HashMap<String, ProjectId>> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for task in snapshot {
            let Some(name) = task.project_name().map(str::trim) else {
                continue;
            };
            if name.is_empty() || !seen.insert(name.to_owned()) {
                continue;
            }
            names.push(name.to_owned());
        }

        let mut table = HashMap::with_capacity(names.len());
        for name in names {
            let project_id = self.store.upsert_active(user_id, &name, at).await?;
            table.insert(name, project_id);
        }
        Ok(table)
    }
}
