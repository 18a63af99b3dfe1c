//! Unit tests for the task record lifecycle.

use crate::sync::domain::{
    PersistedTaskRecord, ProjectId, SourceTask, TaskRecord, TaskRecordId, TaskSource, TaskStatus,
    UserId,
};
use chrono::{TimeDelta, Utc};
use rstest::rstest;

fn entry(external_id: &str, title: &str) -> SourceTask {
    SourceTask::new(external_id, title).expect("valid snapshot entry")
}

#[rstest]
fn from_snapshot_prefers_source_creation_time() {
    let observed = Utc::now();
    let created = observed - TimeDelta::days(3);
    let incoming = entry("ext-1", "Water the plants").with_created_at(created);

    let record =
        TaskRecord::from_snapshot(UserId::new(), TaskSource::Ticktick, &incoming, None, observed);

    assert_eq!(record.status(), TaskStatus::Open);
    assert_eq!(record.created_at(), created);
    assert_eq!(record.first_seen_at(), observed);
    assert_eq!(record.last_seen_at(), observed);
    assert_eq!(record.completed_at(), None);
    assert_eq!(record.note(), None);
}

#[rstest]
fn from_snapshot_falls_back_to_observation_time() {
    let observed = Utc::now();
    let incoming = entry("ext-1", "Water the plants");

    let record =
        TaskRecord::from_snapshot(UserId::new(), TaskSource::Ticktick, &incoming, None, observed);

    assert_eq!(record.created_at(), observed);
}

#[rstest]
fn from_snapshot_links_project_and_captures_source_fields() {
    let observed = Utc::now();
    let due = observed + TimeDelta::days(2);
    let project_id = ProjectId::new();
    let incoming = entry("ext-1", "Water the plants")
        .with_project_name("Garden")
        .with_due_at(due)
        .with_priority(5);

    let record = TaskRecord::from_snapshot(
        UserId::new(),
        TaskSource::Ticktick,
        &incoming,
        Some(project_id),
        observed,
    );

    assert_eq!(record.external_id(), "ext-1");
    assert_eq!(record.title(), "Water the plants");
    assert_eq!(record.project_id(), Some(project_id));
    assert_eq!(record.project_name(), Some("Garden"));
    assert_eq!(record.due_at(), Some(due));
    assert_eq!(record.priority(), Some(5));
}

#[rstest]
fn refresh_of_open_record_reports_no_transition() {
    let observed = Utc::now();
    let created = observed - TimeDelta::days(3);
    let mut record = TaskRecord::from_snapshot(
        UserId::new(),
        TaskSource::Ticktick,
        &entry("ext-1", "Water the plants").with_created_at(created),
        None,
        observed,
    );

    let later = observed + TimeDelta::hours(6);
    let due = later + TimeDelta::days(1);
    let project_id = ProjectId::new();
    let refreshed = entry("ext-1", "Water and feed the plants")
        .with_project_name("Garden")
        .with_due_at(due)
        .with_priority(1);

    let prior = record.refresh_from_snapshot(&refreshed, Some(project_id), later);

    assert_eq!(prior, None);
    assert_eq!(record.title(), "Water and feed the plants");
    assert_eq!(record.project_id(), Some(project_id));
    assert_eq!(record.project_name(), Some("Garden"));
    assert_eq!(record.due_at(), Some(due));
    assert_eq!(record.priority(), Some(1));
    assert_eq!(record.last_seen_at(), later);
    assert_eq!(record.first_seen_at(), observed);
    assert_eq!(record.created_at(), created);
}

#[rstest]
fn refresh_after_sweep_reports_deleted() {
    let observed = Utc::now();
    let mut record = TaskRecord::from_snapshot(
        UserId::new(),
        TaskSource::Ticktick,
        &entry("ext-1", "Water the plants"),
        None,
        observed,
    );
    record.mark_deleted(observed + TimeDelta::hours(1));

    let later = observed + TimeDelta::hours(2);
    let prior = record.refresh_from_snapshot(&entry("ext-1", "Water the plants"), None, later);

    assert_eq!(prior, Some(TaskStatus::Deleted));
    assert_eq!(record.status(), TaskStatus::Open);
    assert_eq!(record.last_seen_at(), later);
}

#[rstest]
fn refresh_after_completion_keeps_audit_fields() {
    let created = Utc::now() - TimeDelta::days(5);
    let first_seen = created + TimeDelta::days(1);
    let completed = created + TimeDelta::days(2);
    let mut record = TaskRecord::from_persisted(PersistedTaskRecord {
        id: TaskRecordId::new(),
        user_id: UserId::new(),
        source: TaskSource::Ticktick,
        external_id: "ext-1".to_owned(),
        title: "Water the plants".to_owned(),
        note: Some("use the small watering can".to_owned()),
        project_id: None,
        project_name: None,
        status: TaskStatus::Done,
        priority: None,
        due_at: None,
        created_at: created,
        first_seen_at: first_seen,
        last_seen_at: completed,
        completed_at: Some(completed),
    });

    let later = created + TimeDelta::days(4);
    let prior = record.refresh_from_snapshot(&entry("ext-1", "Water the plants"), None, later);

    assert_eq!(prior, Some(TaskStatus::Done));
    assert_eq!(record.status(), TaskStatus::Open);
    assert_eq!(record.note(), Some("use the small watering can"));
    assert_eq!(record.completed_at(), Some(completed));
    assert_eq!(record.first_seen_at(), first_seen);
}

#[rstest]
fn mark_deleted_counts_as_an_observation() {
    let observed = Utc::now();
    let mut record = TaskRecord::from_snapshot(
        UserId::new(),
        TaskSource::Ticktick,
        &entry("ext-1", "Water the plants"),
        None,
        observed,
    );

    let swept = observed + TimeDelta::hours(3);
    record.mark_deleted(swept);

    assert_eq!(record.status(), TaskStatus::Deleted);
    assert_eq!(record.last_seen_at(), swept);
}

#[rstest]
fn complete_sets_done_and_completion_time() {
    let observed = Utc::now();
    let mut record = TaskRecord::from_snapshot(
        UserId::new(),
        TaskSource::Ticktick,
        &entry("ext-1", "Water the plants"),
        None,
        observed,
    );

    let done_at = observed + TimeDelta::hours(8);
    record.complete(done_at);

    assert_eq!(record.status(), TaskStatus::Done);
    assert_eq!(record.completed_at(), Some(done_at));
    assert_eq!(record.last_seen_at(), done_at);
}

#[rstest]
fn from_persisted_restores_every_field() {
    let created = Utc::now() - TimeDelta::days(10);
    let data = PersistedTaskRecord {
        id: TaskRecordId::new(),
        user_id: UserId::new(),
        source: TaskSource::Ticktick,
        external_id: "ext-1".to_owned(),
        title: "Water the plants".to_owned(),
        note: Some("north window first".to_owned()),
        project_id: Some(ProjectId::new()),
        project_name: Some("Garden".to_owned()),
        status: TaskStatus::Deleted,
        priority: Some(3),
        due_at: Some(created + TimeDelta::days(12)),
        created_at: created,
        first_seen_at: created + TimeDelta::days(1),
        last_seen_at: created + TimeDelta::days(6),
        completed_at: Some(created + TimeDelta::days(4)),
    };

    let record = TaskRecord::from_persisted(data.clone());

    assert_eq!(record.id(), data.id);
    assert_eq!(record.user_id(), data.user_id);
    assert_eq!(record.source(), data.source);
    assert_eq!(record.external_id(), data.external_id);
    assert_eq!(record.title(), data.title);
    assert_eq!(record.note(), data.note.as_deref());
    assert_eq!(record.project_id(), data.project_id);
    assert_eq!(record.project_name(), data.project_name.as_deref());
    assert_eq!(record.status(), data.status);
    assert_eq!(record.priority(), data.priority);
    assert_eq!(record.due_at(), data.due_at);
    assert_eq!(record.created_at(), data.created_at);
    assert_eq!(record.first_seen_at(), data.first_seen_at);
    assert_eq!(record.last_seen_at(), data.last_seen_at);
    assert_eq!(record.completed_at(), data.completed_at);
}
