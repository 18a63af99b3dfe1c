//! Domain model for snapshot-driven task mirroring.
//!
//! The sync domain models locally mirrored task records, their audit
//! events, auto-provisioned projects, user accounts, and per-user sync
//! diagnostics while keeping all infrastructure concerns outside of the
//! domain boundary.

mod account;
mod diagnostic;
mod error;
mod event;
mod ids;
mod project;
mod record;
mod source;
mod status;

pub use account::{PersistedUserAccount, UserAccount};
pub use diagnostic::{PersistedSyncDiagnostic, SyncDiagnostic};
pub use error::{
    ParseEventKindError, ParseProjectStatusError, ParseTaskSourceError, ParseTaskStatusError,
    SyncDomainError,
};
pub use event::{PersistedTaskEvent, TaskEvent, TaskEventKind};
pub use ids::{EventId, ProjectId, TaskRecordId, UserId};
pub use project::{PersistedProject, Project};
pub use record::{PersistedTaskRecord, TaskRecord};
pub use source::{SourceTask, TaskSource};
pub use status::{ProjectStatus, TaskStatus};
