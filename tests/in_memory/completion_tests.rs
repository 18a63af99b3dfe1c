//! Completion flow tests over the in-memory store.
//!
//! Tests the source-first completion contract: local records close only
//! after the source confirms, and every local close is audited.

use crate::in_memory::helpers::{
    BoxError, TestService, create_user, project_entry, runtime, service,
};
use rstest::rstest;
use std::io;
use taskmirror::sync::domain::{TaskEvent, TaskEventKind};
use taskmirror::sync::ports::{CompletionOutcome, EventStore};
use tokio::runtime::Runtime;

/// Tests that a confirmed completion closes the mirrored record.
#[rstest]
fn confirmed_completion_closes_the_record(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service
        .source
        .queue_snapshot(vec![project_entry("ext-1", "Water the plants", "Garden")]);
    rt.block_on(service.orchestrator.sync_user(user_id));
    let open = rt.block_on(service.orchestrator.open_tasks(user_id))?;
    let record = open.first().expect("one open record");
    service.source.queue_completion(CompletionOutcome::confirmed());

    let report = rt.block_on(
        service
            .orchestrator
            .complete_task(user_id, "proj-Garden", "ext-1"),
    );

    assert!(report.ok);
    assert_eq!(report.tasks_updated, 1);
    assert!(report.message.is_none());
    let still_open = rt.block_on(service.orchestrator.open_tasks(user_id))?;
    assert!(still_open.is_empty());
    let events = rt.block_on(service.store.events_for_task(record.id()))?;
    assert_eq!(
        events.iter().map(TaskEvent::kind).collect::<Vec<_>>(),
        vec![
            TaskEventKind::SyncCreate,
            TaskEventKind::SyncSeen,
            TaskEventKind::ManualComplete,
        ]
    );
    Ok(())
}

/// Tests that an unconfirmed completion leaves local records untouched.
#[rstest]
fn unconfirmed_completion_changes_nothing(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service
        .source
        .queue_snapshot(vec![project_entry("ext-1", "Water the plants", "Garden")]);
    rt.block_on(service.orchestrator.sync_user(user_id));
    service.source.queue_completion(CompletionOutcome::unconfirmed(
        "the source did not confirm completion (open/v1: status 500: boom)",
    ));

    let report = rt.block_on(
        service
            .orchestrator
            .complete_task(user_id, "proj-Garden", "ext-1"),
    );

    assert!(!report.ok);
    assert_eq!(report.tasks_updated, 0);
    assert!(
        report
            .message
            .as_deref()
            .is_some_and(|message| message.contains("did not confirm")),
        "the source failure detail should pass through: {report:?}"
    );
    let open = rt.block_on(service.orchestrator.open_tasks(user_id))?;
    assert_eq!(open.len(), 1);
    Ok(())
}

/// Tests that confirming a task with no local mirror reports zero updates.
#[rstest]
fn completion_without_a_mirror_reports_zero_updates(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service.source.queue_completion(CompletionOutcome::confirmed());

    let report = rt.block_on(
        service
            .orchestrator
            .complete_task(user_id, "proj-Garden", "ext-404"),
    );

    assert!(report.ok);
    assert_eq!(report.tasks_updated, 0);
    Ok(())
}
