//! External source identity and normalized snapshot entries.

use super::{ParseTaskSourceError, SyncDomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// External service a task record is mirrored from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    /// The TickTick task service.
    Ticktick,
}

impl TaskSource {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticktick => "ticktick",
        }
    }
}

impl TryFrom<&str> for TaskSource {
    type Error = ParseTaskSourceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "ticktick" => Ok(Self::Ticktick),
            _ => Err(ParseTaskSourceError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized snapshot entry produced at the source adapter boundary.
///
/// Construction validates the fields every downstream consumer relies on:
/// the external identifier and the title must be non-empty after trimming.
/// Records failing that bar never leave the adapter. Timestamps are parsed
/// by the adapter; unparseable values arrive here as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTask {
    external_id: String,
    title: String,
    project_id: Option<String>,
    project_name: Option<String>,
    created_at: Option<DateTime<Utc>>,
    due_at: Option<DateTime<Utc>>,
    priority: Option<i32>,
}

impl SourceTask {
    /// Creates a validated snapshot entry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncDomainError::EmptyExternalId`] or
    /// [`SyncDomainError::EmptyTitle`] when the respective field is empty
    /// after trimming.
    pub fn new(
        external_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, SyncDomainError> {
        let external_id = external_id.into().trim().to_owned();
        if external_id.is_empty() {
            return Err(SyncDomainError::EmptyExternalId);
        }
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(SyncDomainError::EmptyTitle);
        }

        Ok(Self {
            external_id,
            title,
            project_id: None,
            project_name: None,
            created_at: None,
            due_at: None,
            priority: None,
        })
    }

    /// Sets the source-side project identifier.
    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Sets the display name of the source-side project.
    #[must_use]
    pub fn with_project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    /// Sets the source-side creation timestamp.
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the due timestamp.
    #[must_use]
    pub const fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    /// Sets the source priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns the external identifier.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the source-side project identifier, if any.
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Returns the project display name, if any.
    #[must_use]
    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    /// Returns the source-side creation timestamp, if parseable.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns the due timestamp, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the source priority, if any.
    #[must_use]
    pub const fn priority(&self) -> Option<i32> {
        self.priority
    }
}
