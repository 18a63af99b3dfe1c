//! Minimal user account record for sync fan-out.

use super::{SyncDomainError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account owning mirrored tasks.
///
/// The handle is the caller-facing identity (for example a messenger user
/// id) and is unique per store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    id: UserId,
    handle: String,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserAccount {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted unique handle.
    pub handle: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Creates a new account for the given handle.
    ///
    /// # Errors
    ///
    /// Returns [`SyncDomainError::EmptyHandle`] when the handle is empty
    /// after trimming.
    pub fn new(handle: impl Into<String>, at: DateTime<Utc>) -> Result<Self, SyncDomainError> {
        let handle = handle.into().trim().to_owned();
        if handle.is_empty() {
            return Err(SyncDomainError::EmptyHandle);
        }

        Ok(Self {
            id: UserId::new(),
            handle,
            created_at: at,
        })
    }

    /// Reconstructs an account from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserAccount) -> Self {
        Self {
            id: data.id,
            handle: data.handle,
            created_at: data.created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the unique handle.
    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
