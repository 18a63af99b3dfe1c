//! Wire-format types and decoding for the sync API.
//!
//! Every field is optional on the wire. Records missing the fields a
//! snapshot entry needs are dropped here, before reconciliation sees them.

use crate::sync::domain::SourceTask;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Wire status value for tasks already closed at the source.
const CLOSED_WIRE_STATUS: i32 = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignOnResponse {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct BatchResponse {
    pub inbox_id: Option<String>,
    pub project_profiles: Vec<ProjectProfile>,
    pub sync_task_bean: SyncTaskBean,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SyncTaskBean {
    pub update: Vec<RawTask>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ProjectProfile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub closed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawTask {
    pub id: Option<String>,
    pub title: Option<String>,
    pub project_id: Option<String>,
    pub created_time: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<i32>,
}

/// Maps project identifiers to display names.
///
/// Closed and id-less profiles are skipped; blank names fall back to
/// `Untitled`. The inbox pseudo-project gets the configured name and wins
/// over a profile with the same identifier.
pub(crate) fn project_directory(
    batch: &BatchResponse,
    inbox_name: &str,
) -> HashMap<String, String> {
    let mut directory = HashMap::new();
    for profile in &batch.project_profiles {
        let Some(id) = profile.id.as_deref() else {
            continue;
        };
        if profile.closed.unwrap_or(false) {
            continue;
        }
        let name = profile
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Untitled");
        directory.insert(id.to_owned(), name.to_owned());
    }
    if let Some(inbox_id) = batch.inbox_id.as_deref() {
        directory.insert(inbox_id.to_owned(), inbox_name.to_owned());
    }
    directory
}

/// Converts a batch payload into snapshot entries.
///
/// Entries without an id or title are dropped, as are tasks the source
/// already closed.
pub(crate) fn normalize(batch: &BatchResponse, inbox_name: &str) -> Vec<SourceTask> {
    let directory = project_directory(batch, inbox_name);
    let mut tasks = Vec::new();
    for raw in &batch.sync_task_bean.update {
        if raw.status == Some(CLOSED_WIRE_STATUS) {
            continue;
        }
        if let Some(task) = normalize_task(raw, &directory) {
            tasks.push(task);
        }
    }
    tasks
}

fn normalize_task(raw: &RawTask, directory: &HashMap<String, String>) -> Option<SourceTask> {
    let (Some(id), Some(title)) = (raw.id.as_deref(), raw.title.as_deref()) else {
        debug!("dropping snapshot entry without id or title");
        return None;
    };
    let mut task = match SourceTask::new(id, title) {
        Ok(task) => task,
        Err(err) => {
            debug!(error = %err, "dropping malformed snapshot entry");
            return None;
        }
    };
    if let Some(project_id) = raw.project_id.as_deref() {
        task = task.with_project_id(project_id);
        if let Some(name) = directory.get(project_id) {
            task = task.with_project_name(name.clone());
        }
    }
    if let Some(created_at) = raw.created_time.as_deref().and_then(parse_source_date) {
        task = task.with_created_at(created_at);
    }
    if let Some(due_at) = raw.due_date.as_deref().and_then(parse_source_date) {
        task = task.with_due_at(due_at);
    }
    if let Some(priority) = raw.priority {
        task = task.with_priority(priority);
    }
    Some(task)
}

/// Parses a source timestamp.
///
/// The sync API emits offsets without a colon (`+0000`), which RFC 3339
/// rejects, so a strftime fallback covers that shape. Unparseable values
/// come back as `None`.
pub(crate) fn parse_source_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
