//! Taskmirror: snapshot-driven mirroring of external task services.
//!
//! This crate ingests periodic task snapshots from an external service
//! (currently TickTick) and reconciles them against a locally persisted
//! store, maintaining per-task lifecycle state and an append-only audit
//! trail of every transition.
//!
//! # Architecture
//!
//! Taskmirror follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and external sources
//! - **Adapters**: Concrete implementations of ports (database, HTTP APIs)
//!
//! # Modules
//!
//! - [`sync`]: Snapshot reconciliation, audit events, and orchestration
//! - [`ticktick`]: TickTick client implementing the snapshot source port

pub mod sync;
pub mod ticktick;
