//! `PostgreSQL` store implementation for snapshot reconciliation.

use super::{
    models::{
        NewProjectRow, NewSyncStateRow, NewTaskEventRow, NewTaskRecordRow, NewUserRow, ProjectRow,
        SyncStateRow, TaskEventRow, TaskRecordRow, UserRow,
    },
    schema::{projects, sync_states, task_events, tasks, users},
};
use crate::sync::{
    domain::{
        EventId, PersistedProject, PersistedSyncDiagnostic, PersistedTaskEvent,
        PersistedTaskRecord, PersistedUserAccount, Project, ProjectId, ProjectStatus,
        SyncDiagnostic, TaskEvent, TaskEventKind, TaskRecord, TaskRecordId, TaskSource,
        TaskStatus, UserAccount, UserId,
    },
    ports::{AccountStore, EventStore, ProjectStore, StoreError, StoreResult, TaskStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;

/// `PostgreSQL` connection pool type used by sync adapters.
pub type SyncPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed store for all four storage ports.
#[derive(Debug, Clone)]
pub struct PostgresSyncStore {
    pool: SyncPgPool,
}

impl PostgresSyncStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SyncPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

#[async_trait]
impl TaskStore for PostgresSyncStore {
    async fn find_by_external(
        &self,
        user_id: UserId,
        source: TaskSource,
        external_id: &str,
    ) -> StoreResult<Option<TaskRecord>> {
        let external_id = external_id.to_owned();
        self.run_blocking(move |connection| {
            let row = find_record_row(connection, user_id, source, &external_id)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn insert(&self, record: &TaskRecord) -> StoreResult<()> {
        let record_id = record.id();
        let user_id = record.user_id();
        let source = record.source();
        let external_id = record.external_id().to_owned();
        let new_row = to_new_record_row(record);

        self.run_blocking(move |connection| {
            // The unique index remains authoritative in the window between
            // this check and the insert.
            if find_record_row(connection, user_id, source, &external_id)?.is_some() {
                return Err(StoreError::duplicate(format!(
                    "task record for {user_id}/{source}/{external_id}"
                )));
            }

            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_external_identity_violation(info.as_ref()) =>
                    {
                        StoreError::duplicate(format!(
                            "task record for {user_id}/{source}/{external_id}"
                        ))
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::duplicate(format!("task record {record_id}"))
                    }
                    _ => StoreError::persistence(err),
                })?;

            Ok(())
        })
        .await
    }

    async fn update(&self, record: &TaskRecord) -> StoreResult<()> {
        let record_id = record.id();
        let title = record.title().to_owned();
        let project_id = record.project_id().map(ProjectId::into_inner);
        let project_name = record.project_name().map(str::to_owned);
        let status = record.status().as_str();
        let priority = record.priority();
        let due_at = record.due_at();
        let last_seen_at = record.last_seen_at();
        let completed_at = record.completed_at();

        self.run_blocking(move |connection| {
            // Sync-managed columns only; the note and the identity and
            // first-seen columns never change here.
            let updated = diesel::update(tasks::table.filter(tasks::id.eq(record_id.into_inner())))
                .set((
                    tasks::title.eq(title),
                    tasks::project_id.eq(project_id),
                    tasks::project_name.eq(project_name),
                    tasks::status.eq(status),
                    tasks::priority.eq(priority),
                    tasks::due_at.eq(due_at),
                    tasks::last_seen_at.eq(last_seen_at),
                    tasks::completed_at.eq(completed_at),
                ))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if updated == 0 {
                return Err(StoreError::not_found(format!("task record {record_id}")));
            }
            Ok(())
        })
        .await
    }

    async fn mark_unseen_deleted(
        &self,
        user_id: UserId,
        source: TaskSource,
        touched: &[TaskRecordId],
        swept_at: DateTime<Utc>,
    ) -> StoreResult<Vec<TaskRecordId>> {
        let touched: Vec<uuid::Uuid> = touched
            .iter()
            .copied()
            .map(TaskRecordId::into_inner)
            .collect();
        self.run_blocking(move |connection| {
            // `ne_all` over an empty set matches every row, so a pass that
            // touched nothing sweeps all open records.
            let swept: Vec<uuid::Uuid> = diesel::update(
                tasks::table
                    .filter(tasks::user_id.eq(user_id.into_inner()))
                    .filter(tasks::source.eq(source.as_str()))
                    .filter(tasks::status.eq(TaskStatus::Open.as_str()))
                    .filter(tasks::id.ne_all(touched)),
            )
            .set((
                tasks::status.eq(TaskStatus::Deleted.as_str()),
                tasks::last_seen_at.eq(swept_at),
            ))
            .returning(tasks::id)
            .get_results(connection)
            .map_err(StoreError::persistence)?;
            Ok(swept.into_iter().map(TaskRecordId::from_uuid).collect())
        })
        .await
    }

    async fn complete_open(
        &self,
        user_id: UserId,
        source: TaskSource,
        external_id: &str,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<Vec<TaskRecordId>> {
        let external_id = external_id.to_owned();
        self.run_blocking(move |connection| {
            let completed: Vec<uuid::Uuid> = diesel::update(
                tasks::table
                    .filter(tasks::user_id.eq(user_id.into_inner()))
                    .filter(tasks::source.eq(source.as_str()))
                    .filter(tasks::external_id.eq(&external_id))
                    .filter(tasks::status.eq(TaskStatus::Open.as_str())),
            )
            .set((
                tasks::status.eq(TaskStatus::Done.as_str()),
                tasks::completed_at.eq(completed_at),
                tasks::last_seen_at.eq(completed_at),
            ))
            .returning(tasks::id)
            .get_results(connection)
            .map_err(StoreError::persistence)?;
            Ok(completed.into_iter().map(TaskRecordId::from_uuid).collect())
        })
        .await
    }

    async fn open_tasks(&self, user_id: UserId) -> StoreResult<Vec<TaskRecord>> {
        self.run_blocking(move |connection| {
            // Postgres sorts ascending NULLS LAST, so records without a
            // project come after the named ones.
            let rows = tasks::table
                .filter(tasks::user_id.eq(user_id.into_inner()))
                .filter(tasks::status.eq(TaskStatus::Open.as_str()))
                .order((tasks::project_name.asc(), tasks::created_at.asc()))
                .select(TaskRecordRow::as_select())
                .load::<TaskRecordRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }
}

#[async_trait]
impl ProjectStore for PostgresSyncStore {
    async fn upsert_active(
        &self,
        user_id: UserId,
        name: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<ProjectId> {
        let name = name.trim().to_owned();
        self.run_blocking(move |connection| {
            let project =
                Project::provisioned(user_id, &name, at).map_err(StoreError::persistence)?;
            let new_row = to_new_project_row(&project);
            let id: uuid::Uuid = diesel::insert_into(projects::table)
                .values(&new_row)
                .on_conflict((projects::user_id, projects::name))
                .do_update()
                .set((
                    projects::status.eq(ProjectStatus::Active.as_str()),
                    projects::updated_at.eq(at),
                ))
                .returning(projects::id)
                .get_result(connection)
                .map_err(StoreError::persistence)?;
            Ok(ProjectId::from_uuid(id))
        })
        .await
    }

    async fn projects(&self, user_id: UserId) -> StoreResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::user_id.eq(user_id.into_inner()))
                .order(projects::name.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }
}

#[async_trait]
impl EventStore for PostgresSyncStore {
    async fn append(&self, events: &[TaskEvent]) -> StoreResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        let new_rows: Vec<NewTaskEventRow> = events.iter().map(to_new_event_row).collect();
        self.run_blocking(move |connection| {
            // A single multi-row insert keeps the sequence column in slice
            // order.
            diesel::insert_into(task_events::table)
                .values(&new_rows)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn events_for_task(&self, task_id: TaskRecordId) -> StoreResult<Vec<TaskEvent>> {
        self.run_blocking(move |connection| {
            let rows = task_events::table
                .filter(task_events::task_id.eq(task_id.into_inner()))
                .order((task_events::at.asc(), task_events::seq.asc()))
                .select(TaskEventRow::as_select())
                .load::<TaskEventRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_event).collect()
        })
        .await
    }
}

#[async_trait]
impl AccountStore for PostgresSyncStore {
    async fn ensure_user(&self, handle: &str, at: DateTime<Utc>) -> StoreResult<UserId> {
        let handle = handle.trim().to_owned();
        self.run_blocking(move |connection| {
            let account = UserAccount::new(&handle, at).map_err(StoreError::persistence)?;
            let new_row = to_new_user_row(&account);
            // The no-op conflict update makes RETURNING yield the existing
            // row as well as a fresh one.
            let id: uuid::Uuid = diesel::insert_into(users::table)
                .values(&new_row)
                .on_conflict(users::handle)
                .do_update()
                .set(users::handle.eq(excluded(users::handle)))
                .returning(users::id)
                .get_result(connection)
                .map_err(StoreError::persistence)?;
            Ok(UserId::from_uuid(id))
        })
        .await
    }

    async fn list_users(&self) -> StoreResult<Vec<UserAccount>> {
        self.run_blocking(move |connection| {
            let rows = users::table
                .order((users::created_at.asc(), users::handle.asc()))
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(StoreError::persistence)?;
            Ok(rows.into_iter().map(row_to_account).collect())
        })
        .await
    }

    async fn record_diagnostic(&self, diagnostic: &SyncDiagnostic) -> StoreResult<()> {
        let new_row = to_new_sync_state_row(diagnostic)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(sync_states::table)
                .values(&new_row)
                .on_conflict((sync_states::user_id, sync_states::source))
                .do_update()
                .set((
                    sync_states::ok.eq(excluded(sync_states::ok)),
                    sync_states::tasks_count.eq(excluded(sync_states::tasks_count)),
                    sync_states::message.eq(excluded(sync_states::message)),
                    sync_states::recorded_at.eq(excluded(sync_states::recorded_at)),
                ))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn diagnostic(
        &self,
        user_id: UserId,
        source: TaskSource,
    ) -> StoreResult<Option<SyncDiagnostic>> {
        self.run_blocking(move |connection| {
            let row = sync_states::table
                .filter(sync_states::user_id.eq(user_id.into_inner()))
                .filter(sync_states::source.eq(source.as_str()))
                .select(SyncStateRow::as_select())
                .first::<SyncStateRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_diagnostic).transpose()
        })
        .await
    }
}

fn find_record_row(
    connection: &mut PgConnection,
    user_id: UserId,
    source: TaskSource,
    external_id: &str,
) -> StoreResult<Option<TaskRecordRow>> {
    tasks::table
        .filter(tasks::user_id.eq(user_id.into_inner()))
        .filter(tasks::source.eq(source.as_str()))
        .filter(tasks::external_id.eq(external_id))
        .select(TaskRecordRow::as_select())
        .first::<TaskRecordRow>(connection)
        .optional()
        .map_err(StoreError::persistence)
}

fn is_external_identity_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_tasks_external_identity_unique")
}

fn to_new_record_row(record: &TaskRecord) -> NewTaskRecordRow {
    NewTaskRecordRow {
        id: record.id().into_inner(),
        user_id: record.user_id().into_inner(),
        source: record.source().as_str().to_owned(),
        external_id: record.external_id().to_owned(),
        title: record.title().to_owned(),
        note: record.note().map(str::to_owned),
        project_id: record.project_id().map(ProjectId::into_inner),
        project_name: record.project_name().map(str::to_owned),
        status: record.status().as_str().to_owned(),
        priority: record.priority(),
        due_at: record.due_at(),
        created_at: record.created_at(),
        first_seen_at: record.first_seen_at(),
        last_seen_at: record.last_seen_at(),
        completed_at: record.completed_at(),
    }
}

fn row_to_record(row: TaskRecordRow) -> StoreResult<TaskRecord> {
    let TaskRecordRow {
        id,
        user_id,
        source: persisted_source,
        external_id,
        title,
        note,
        project_id,
        project_name,
        status: persisted_status,
        priority,
        due_at,
        created_at,
        first_seen_at,
        last_seen_at,
        completed_at,
    } = row;

    let source =
        TaskSource::try_from(persisted_source.as_str()).map_err(StoreError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(StoreError::persistence)?;

    let data = PersistedTaskRecord {
        id: TaskRecordId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        source,
        external_id,
        title,
        note,
        project_id: project_id.map(ProjectId::from_uuid),
        project_name,
        status,
        priority,
        due_at,
        created_at,
        first_seen_at,
        last_seen_at,
        completed_at,
    };
    Ok(TaskRecord::from_persisted(data))
}

fn to_new_project_row(project: &Project) -> NewProjectRow {
    NewProjectRow {
        id: project.id().into_inner(),
        user_id: project.user_id().into_inner(),
        name: project.name().to_owned(),
        status: project.status().as_str().to_owned(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn row_to_project(row: ProjectRow) -> StoreResult<Project> {
    let status = ProjectStatus::try_from(row.status.as_str()).map_err(StoreError::persistence)?;
    let data = PersistedProject {
        id: ProjectId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        name: row.name,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Project::from_persisted(data))
}

fn to_new_event_row(event: &TaskEvent) -> NewTaskEventRow {
    NewTaskEventRow {
        id: event.id().into_inner(),
        user_id: event.user_id().into_inner(),
        task_id: event.task_id().into_inner(),
        kind: event.kind().as_str().to_owned(),
        at: event.at(),
        from_status: event.from_status().map(|status| status.as_str().to_owned()),
        to_status: event.to_status().map(|status| status.as_str().to_owned()),
        due_at: event.due_at(),
        meta: event.meta().cloned(),
    }
}

fn row_to_event(row: TaskEventRow) -> StoreResult<TaskEvent> {
    let TaskEventRow {
        id,
        user_id,
        task_id,
        kind: persisted_kind,
        at,
        from_status,
        to_status,
        due_at,
        meta,
    } = row;

    let kind = TaskEventKind::try_from(persisted_kind.as_str()).map_err(StoreError::persistence)?;
    let from_status = from_status
        .as_deref()
        .map(TaskStatus::try_from)
        .transpose()
        .map_err(StoreError::persistence)?;
    let to_status = to_status
        .as_deref()
        .map(TaskStatus::try_from)
        .transpose()
        .map_err(StoreError::persistence)?;

    let data = PersistedTaskEvent {
        id: EventId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        task_id: TaskRecordId::from_uuid(task_id),
        kind,
        at,
        from_status,
        to_status,
        due_at,
        meta,
    };
    Ok(TaskEvent::from_persisted(data))
}

fn to_new_user_row(account: &UserAccount) -> NewUserRow {
    NewUserRow {
        id: account.id().into_inner(),
        handle: account.handle().to_owned(),
        created_at: account.created_at(),
    }
}

fn row_to_account(row: UserRow) -> UserAccount {
    UserAccount::from_persisted(PersistedUserAccount {
        id: UserId::from_uuid(row.id),
        handle: row.handle,
        created_at: row.created_at,
    })
}

fn to_new_sync_state_row(diagnostic: &SyncDiagnostic) -> StoreResult<NewSyncStateRow> {
    let tasks_count = i32::try_from(diagnostic.tasks_count()).map_err(StoreError::persistence)?;
    Ok(NewSyncStateRow {
        user_id: diagnostic.user_id().into_inner(),
        source: diagnostic.source().as_str().to_owned(),
        ok: diagnostic.ok(),
        tasks_count,
        message: diagnostic.message().map(str::to_owned),
        recorded_at: diagnostic.recorded_at(),
    })
}

fn row_to_diagnostic(row: SyncStateRow) -> StoreResult<SyncDiagnostic> {
    let source = TaskSource::try_from(row.source.as_str()).map_err(StoreError::persistence)?;
    let tasks_count = usize::try_from(row.tasks_count).map_err(StoreError::persistence)?;
    let data = PersistedSyncDiagnostic {
        user_id: UserId::from_uuid(row.user_id),
        source,
        ok: row.ok,
        tasks_count,
        message: row.message,
        recorded_at: row.recorded_at,
    };
    Ok(SyncDiagnostic::from_persisted(data))
}
