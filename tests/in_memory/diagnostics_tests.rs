//! Diagnostics tests over the in-memory store.
//!
//! Tests that every pass outcome lands as the user's latest diagnostic
//! and that fanned-out passes keep users independent.

use crate::in_memory::helpers::{BoxError, TestService, create_user, entry, runtime, service};
use rstest::rstest;
use std::io;
use taskmirror::sync::ports::SourceError;
use tokio::runtime::Runtime;

/// Tests that a successful pass records an ok diagnostic.
#[rstest]
fn successful_pass_records_an_ok_diagnostic(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants")]);

    rt.block_on(service.orchestrator.sync_user(user_id));

    let diagnostic = rt
        .block_on(service.orchestrator.last_sync(user_id))?
        .expect("a pass should leave a diagnostic");
    assert!(diagnostic.ok());
    assert_eq!(diagnostic.tasks_count(), 1);
    assert!(diagnostic.message().is_none());
    Ok(())
}

/// Tests that a failed fetch records the failure detail.
#[rstest]
fn failed_fetch_records_the_failure_detail(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service
        .source
        .queue_fetch_error(SourceError::Network("connection reset".to_owned()));

    let report = rt.block_on(service.orchestrator.sync_user(user_id));

    assert!(!report.ok);
    let diagnostic = rt
        .block_on(service.orchestrator.last_sync(user_id))?
        .expect("a failed pass should leave a diagnostic");
    assert!(!diagnostic.ok());
    assert_eq!(diagnostic.tasks_count(), 0);
    assert!(
        diagnostic
            .message()
            .is_some_and(|message| message.contains("network error")),
        "the failure detail should be recorded: {diagnostic:?}"
    );
    Ok(())
}

/// Tests that a later pass replaces the previous diagnostic.
#[rstest]
fn later_outcomes_replace_earlier_ones(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let user_id = create_user(&rt, &service, "tg-100")?;
    service
        .source
        .queue_fetch_error(SourceError::Network("connection reset".to_owned()));
    rt.block_on(service.orchestrator.sync_user(user_id));

    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants")]);
    rt.block_on(service.orchestrator.sync_user(user_id));

    let diagnostic = rt
        .block_on(service.orchestrator.last_sync(user_id))?
        .expect("a diagnostic");
    assert!(diagnostic.ok(), "the recovery should overwrite the failure");
    Ok(())
}

/// Tests that a batch pass leaves one diagnostic per user.
#[rstest]
fn batch_passes_record_per_user_diagnostics(
    runtime: io::Result<Runtime>,
    service: TestService,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let gardener = create_user(&rt, &service, "tg-100")?;
    let librarian = create_user(&rt, &service, "tg-200")?;
    service
        .source
        .queue_snapshot(vec![entry("ext-1", "Water the plants")]);

    let report = rt.block_on(service.orchestrator.sync_all_users());

    assert!(report.ok);
    assert_eq!(report.users_synced, 2);
    assert_eq!(report.users_failed, 0);
    for user_id in [gardener, librarian] {
        let diagnostic = rt
            .block_on(service.orchestrator.last_sync(user_id))?
            .expect("each user should get a diagnostic");
        assert!(diagnostic.ok());
        assert_eq!(diagnostic.tasks_count(), 1);
    }
    Ok(())
}
