//! Auto-provisioned project aggregate.

use super::{ProjectId, ProjectStatus, SyncDomainError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project owned by a user, keyed by its case-sensitive display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    user_id: UserId,
    name: String,
    status: ProjectStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProject {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Owning user.
    pub user_id: UserId,
    /// Persisted display name.
    pub name: String,
    /// Persisted lifecycle status.
    pub status: ProjectStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates an active project provisioned from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SyncDomainError::EmptyProjectName`] when the name is empty
    /// after trimming.
    pub fn provisioned(
        user_id: UserId,
        name: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<Self, SyncDomainError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(SyncDomainError::EmptyProjectName);
        }

        Ok(Self {
            id: ProjectId::new(),
            user_id,
            name,
            status: ProjectStatus::Active,
            created_at: at,
            updated_at: at,
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProject) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            name: data.name,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Forces the project back to [`ProjectStatus::Active`].
    ///
    /// Snapshot provisioning calls this on every pass that names the
    /// project, whatever state it was parked in.
    pub fn activate(&mut self, at: DateTime<Utc>) {
        self.status = ProjectStatus::Active;
        self.updated_at = at;
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
