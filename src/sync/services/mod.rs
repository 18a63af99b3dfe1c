//! Application services for snapshot reconciliation.

mod orchestrator;
mod projects;
mod reconcile;

pub use orchestrator::{BatchSyncReport, SyncOrchestrator, TaskCompletionReport, UserSyncReport};
pub use projects::ProjectResolver;
pub use reconcile::{ReconcileSummary, ReconciliationEngine};
