//! Reconciliation flow tests over the in-memory store.
//!
//! Tests full passes through the orchestrator: mirroring snapshots,
//! sweeping absences, reopening returners, and the audit trail the
//! passes leave behind.

use crate::in_memory::helpers::{
    BoxError, TestService, create_user, entry, project_entry, runtime, service,
};
use rstest::rstest;
use std::io;
use taskmirror::sync::domain::{ProjectStatus, TaskEvent, TaskEventKind, TaskRecordId, TaskStatus};
use taskmirror::sync::ports::{EventStore, ProjectStore};
use tokio::runtime::Runtime;

/// Returns the replayed event kinds for a task.
fn kinds_for(
    rt: &Runtime,
    service: &TestService,
    task_id: TaskRecordId,
) -> Result<Vec<TaskEventKind>, BoxError> {
    let events = rt.block_on(service.store.events_for_task(task_id))?;
    Ok(events.iter().map(TaskEvent::kind).collect())
}

/// Tests that a first pass mirrors every snapshot entry as an open record.
#[rstest]
fn first_pass_mirrors_the_snapshot(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service.source.queue_snapshot(vec![
        project_entry("ext-1", "Water the plants", "Garden"),
        entry("ext-2", "File the report"),
    ]);

    let report = rt.block_on(service.orchestrator.sync_user(user_id));

    assert!(report.ok, "pass should succeed: {report:?}");
    assert_eq!(report.tasks_count, 2);
    let open = rt.block_on(service.orchestrator.open_tasks(user_id))?;
    assert_eq!(open.len(), 2);
    let first = open.first().expect("two open records");
    assert_eq!(first.external_id(), "ext-1");
    assert_eq!(first.project_name(), Some("Garden"));
    assert_eq!(first.status(), TaskStatus::Open);
    let second = open.get(1).expect("two open records");
    assert_eq!(second.external_id(), "ext-2");
    assert_eq!(second.project_name(), None);
    Ok(())
}

/// Tests that repeating the same snapshot updates in place.
#[rstest]
fn repeated_passes_refresh_in_place(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants")]);
    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants daily")]);

    rt.block_on(service.orchestrator.sync_user(user_id));
    let report = rt.block_on(service.orchestrator.sync_user(user_id));

    assert!(report.ok);
    let open = rt.block_on(service.orchestrator.open_tasks(user_id))?;
    assert_eq!(open.len(), 1);
    let record = open.first().expect("one open record");
    assert_eq!(record.title(), "Water the plants daily");
    Ok(())
}

/// Tests that entries missing from a later snapshot are soft-deleted.
#[rstest]
fn absent_entries_are_swept(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service.source.queue_snapshot(vec![
        entry("ext-1", "Water the plants"),
        entry("ext-2", "File the report"),
    ]);
    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants")]);

    rt.block_on(service.orchestrator.sync_user(user_id));
    rt.block_on(service.orchestrator.sync_user(user_id));

    let open = rt.block_on(service.orchestrator.open_tasks(user_id))?;
    assert_eq!(open.len(), 1);
    assert_eq!(open.first().expect("one open record").external_id(), "ext-1");
    Ok(())
}

/// Tests that a swept record reopens when the entry returns.
#[rstest]
fn returning_entries_reopen(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants")]);
    service.source.queue_snapshot(Vec::new());
    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants")]);

    rt.block_on(service.orchestrator.sync_user(user_id));
    rt.block_on(service.orchestrator.sync_user(user_id));
    rt.block_on(service.orchestrator.sync_user(user_id));

    let open = rt.block_on(service.orchestrator.open_tasks(user_id))?;
    assert_eq!(open.len(), 1);
    let record = open.first().expect("one open record");
    assert_eq!(record.status(), TaskStatus::Open);
    assert_eq!(
        kinds_for(&rt, &service, record.id())?,
        vec![
            TaskEventKind::SyncCreate,
            TaskEventKind::SyncSeen,
            TaskEventKind::SyncReopen,
            TaskEventKind::SyncSeen,
        ]
    );
    Ok(())
}

/// Tests that a task's audit trail replays in timestamp order.
#[rstest]
fn audit_events_replay_in_order(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    for _ in 0..3 {
        service
            .source
            .queue_snapshot(vec![entry("ext-1", "Water the plants")]);
        rt.block_on(service.orchestrator.sync_user(user_id));
    }

    let open = rt.block_on(service.orchestrator.open_tasks(user_id))?;
    let record = open.first().expect("one open record");
    let events = rt.block_on(service.store.events_for_task(record.id()))?;

    assert_eq!(events.len(), 4);
    assert!(
        events
            .iter()
            .zip(events.iter().skip(1))
            .all(|(earlier, later)| earlier.at() <= later.at()),
        "events should replay oldest first"
    );
    let create = events.first().expect("create event");
    assert_eq!(create.kind(), TaskEventKind::SyncCreate);
    assert_eq!(create.to_status(), Some(TaskStatus::Open));
    Ok(())
}

/// Tests that snapshot project names provision active projects once.
#[rstest]
fn snapshot_projects_are_provisioned_once(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service
        .source
        .queue_snapshot(vec![project_entry("ext-1", "Water the plants", "Garden")]);
    service
        .source
        .queue_snapshot(vec![project_entry("ext-2", "Prune the roses", "Garden")]);

    rt.block_on(service.orchestrator.sync_user(user_id));
    rt.block_on(service.orchestrator.sync_user(user_id));

    let projects = rt.block_on(service.store.projects(user_id))?;
    assert_eq!(projects.len(), 1);
    let project = projects.first().expect("one project");
    assert_eq!(project.name(), "Garden");
    assert_eq!(project.status(), ProjectStatus::Active);
    Ok(())
}

/// Tests that one user's sweep leaves other users' records alone.
#[rstest]
fn passes_are_scoped_to_one_user(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let gardener = create_user(&rt, &service, "tg-100")?;
    let librarian = create_user(&rt, &service, "tg-200")?;
    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants")]);
    rt.block_on(service.orchestrator.sync_user(gardener));

    service.source.queue_snapshot(Vec::new());
    rt.block_on(service.orchestrator.sync_user(librarian));

    let open = rt.block_on(service.orchestrator.open_tasks(gardener))?;
    assert_eq!(open.len(), 1, "another user's empty pass must not sweep");
    Ok(())
}
