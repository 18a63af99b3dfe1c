//! Snapshot reconciliation for externally sourced tasks.
//!
//! This module keeps a local task store aligned with periodic snapshots
//! from an external task service: creating records on first observation,
//! refreshing them on every later observation, soft-deleting records that
//! disappear from the snapshot, and reopening records that reappear. Every
//! transition is recorded in an append-only audit log. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
