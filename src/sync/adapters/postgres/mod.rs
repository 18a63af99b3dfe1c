//! `PostgreSQL` adapters for snapshot reconciliation persistence.

mod models;
mod schema;
mod store;

pub use store::{PostgresSyncStore, SyncPgPool};
