//! Port contracts for snapshot reconciliation.
//!
//! Ports define infrastructure-agnostic interfaces used by sync services.

pub mod source;
pub mod store;

pub use source::{CompletionOutcome, SnapshotSource, SourceError, SourceResult};
pub use store::{AccountStore, EventStore, ProjectStore, StoreError, StoreResult, TaskStore};
