//! Unit tests for the sync module.
//!
//! Tests are organised by layer: domain invariants, record lifecycle,
//! reconciliation passes over the in-memory store, and orchestration
//! flows including fan-out and completion.

mod record_tests;
