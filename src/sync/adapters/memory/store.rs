//! In-memory store for reconciliation and orchestration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::sync::{
    domain::{
        Project, ProjectId, SyncDiagnostic, TaskEvent, TaskRecord, TaskRecordId, TaskSource,
        TaskStatus, UserAccount, UserId,
    },
    ports::{AccountStore, EventStore, ProjectStore, StoreError, StoreResult, TaskStore},
};

/// Thread-safe in-memory store backing all four storage ports.
///
/// Events are held in append order so that replay-order queries can break
/// timestamp ties the same way the relational store does.
#[derive(Debug, Clone, Default)]
pub struct InMemorySyncStore {
    state: Arc<RwLock<InMemorySyncState>>,
}

#[derive(Debug, Default)]
struct InMemorySyncState {
    accounts: HashMap<UserId, UserAccount>,
    handle_index: HashMap<String, UserId>,
    tasks: HashMap<TaskRecordId, TaskRecord>,
    external_index: HashMap<(UserId, TaskSource, String), TaskRecordId>,
    projects: HashMap<ProjectId, Project>,
    project_index: HashMap<(UserId, String), ProjectId>,
    events: Vec<TaskEvent>,
    diagnostics: HashMap<(UserId, TaskSource), SyncDiagnostic>,
}

impl InMemorySyncStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn external_key(record: &TaskRecord) -> (UserId, TaskSource, String) {
    (
        record.user_id(),
        record.source(),
        record.external_id().to_owned(),
    )
}

#[async_trait]
impl TaskStore for InMemorySyncStore {
    async fn find_by_external(
        &self,
        user_id: UserId,
        source: TaskSource,
        external_id: &str,
    ) -> StoreResult<Option<TaskRecord>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let record = state
            .external_index
            .get(&(user_id, source, external_id.to_owned()))
            .and_then(|task_id| state.tasks.get(task_id))
            .cloned();
        Ok(record)
    }

    async fn insert(&self, record: &TaskRecord) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        if state.tasks.contains_key(&record.id()) {
            return Err(StoreError::duplicate(format!("task record {}", record.id())));
        }

        let key = external_key(record);
        if state.external_index.contains_key(&key) {
            return Err(StoreError::duplicate(format!(
                "task record for {}/{}/{}",
                key.0, key.1, key.2
            )));
        }

        state.external_index.insert(key, record.id());
        state.tasks.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &TaskRecord) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        // External identity is immutable on the record, so the index needs
        // no maintenance here.
        if !state.tasks.contains_key(&record.id()) {
            return Err(StoreError::not_found(format!(
                "task record {}",
                record.id()
            )));
        }
        state.tasks.insert(record.id(), record.clone());
        Ok(())
    }

    async fn mark_unseen_deleted(
        &self,
        user_id: UserId,
        source: TaskSource,
        touched: &[TaskRecordId],
        swept_at: DateTime<Utc>,
    ) -> StoreResult<Vec<TaskRecordId>> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let touched: HashSet<TaskRecordId> = touched.iter().copied().collect();
        let mut swept = Vec::new();
        for record in state.tasks.values_mut() {
            if record.user_id() == user_id
                && record.source() == source
                && record.status() == TaskStatus::Open
                && !touched.contains(&record.id())
            {
                record.mark_deleted(swept_at);
                swept.push(record.id());
            }
        }
        Ok(swept)
    }

    async fn complete_open(
        &self,
        user_id: UserId,
        source: TaskSource,
        external_id: &str,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<Vec<TaskRecordId>> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let Some(task_id) = state
            .external_index
            .get(&(user_id, source, external_id.to_owned()))
            .copied()
        else {
            return Ok(Vec::new());
        };
        let Some(record) = state.tasks.get_mut(&task_id) else {
            return Ok(Vec::new());
        };
        if record.status() != TaskStatus::Open {
            return Ok(Vec::new());
        }
        record.complete(completed_at);
        Ok(vec![task_id])
    }

    async fn open_tasks(&self, user_id: UserId) -> StoreResult<Vec<TaskRecord>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let mut open: Vec<TaskRecord> = state
            .tasks
            .values()
            .filter(|record| record.user_id() == user_id && record.status() == TaskStatus::Open)
            .cloned()
            .collect();
        open.sort_by(|a, b| {
            (a.project_name().is_none(), a.project_name(), a.created_at())
                .cmp(&(b.project_name().is_none(), b.project_name(), b.created_at()))
        });
        Ok(open)
    }
}

#[async_trait]
impl ProjectStore for InMemorySyncStore {
    async fn upsert_active(
        &self,
        user_id: UserId,
        name: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<ProjectId> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let name = name.trim();
        if let Some(project_id) = state.project_index.get(&(user_id, name.to_owned())).copied() {
            if let Some(project) = state.projects.get_mut(&project_id) {
                project.activate(at);
            }
            return Ok(project_id);
        }

        let project = Project::provisioned(user_id, name, at).map_err(StoreError::persistence)?;
        let project_id = project.id();
        state
            .project_index
            .insert((user_id, project.name().to_owned()), project_id);
        state.projects.insert(project_id, project);
        Ok(project_id)
    }

    async fn projects(&self, user_id: UserId) -> StoreResult<Vec<Project>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|project| project.user_id() == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(projects)
    }
}

#[async_trait]
impl EventStore for InMemorySyncStore {
    async fn append(&self, events: &[TaskEvent]) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        state.events.extend_from_slice(events);
        Ok(())
    }

    async fn events_for_task(&self, task_id: TaskRecordId) -> StoreResult<Vec<TaskEvent>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let mut events: Vec<TaskEvent> = state
            .events
            .iter()
            .filter(|event| event.task_id() == task_id)
            .cloned()
            .collect();
        // Stable sort keeps append order for equal timestamps.
        events.sort_by_key(TaskEvent::at);
        Ok(events)
    }
}

#[async_trait]
impl AccountStore for InMemorySyncStore {
    async fn ensure_user(&self, handle: &str, at: DateTime<Utc>) -> StoreResult<UserId> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let handle = handle.trim();
        if let Some(user_id) = state.handle_index.get(handle).copied() {
            return Ok(user_id);
        }

        let account = UserAccount::new(handle, at).map_err(StoreError::persistence)?;
        let user_id = account.id();
        state
            .handle_index
            .insert(account.handle().to_owned(), user_id);
        state.accounts.insert(user_id, account);
        Ok(user_id)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserAccount>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        let mut accounts: Vec<UserAccount> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| (a.created_at(), a.handle()).cmp(&(b.created_at(), b.handle())));
        Ok(accounts)
    }

    async fn record_diagnostic(&self, diagnostic: &SyncDiagnostic) -> StoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        state
            .diagnostics
            .insert((diagnostic.user_id(), diagnostic.source()), diagnostic.clone());
        Ok(())
    }

    async fn diagnostic(
        &self,
        user_id: UserId,
        source: TaskSource,
    ) -> StoreResult<Option<SyncDiagnostic>> {
        let state = self
            .state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state.diagnostics.get(&(user_id, source)).cloned())
    }
}
