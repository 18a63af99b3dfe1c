//! Error types for sync domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain sync values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncDomainError {
    /// The external task identifier is empty after trimming.
    #[error("external task identifier must not be empty")]
    EmptyExternalId,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The user handle is empty after trimming.
    #[error("user handle must not be empty")]
    EmptyHandle,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing project statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project status: {0}")]
pub struct ParseProjectStatusError(pub String);

/// Error returned while parsing task sources from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task source: {0}")]
pub struct ParseTaskSourceError(pub String);

/// Error returned while parsing audit event kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown event kind: {0}")]
pub struct ParseEventKindError(pub String);
