//! Persistence adapters for the sync module.
//!
//! This module provides concrete implementations of the storage ports,
//! following hexagonal architecture principles. Adapters handle all
//! infrastructure concerns while the domain remains pure.
//!
//! # Available Adapters
//!
//! - [`memory::InMemorySyncStore`]: Thread-safe in-memory storage for
//!   unit testing
//! - [`postgres::PostgresSyncStore`]: Production-grade `PostgreSQL`
//!   persistence using Diesel ORM
//!
//! Both adapters back all four storage ports ([`TaskStore`],
//! [`ProjectStore`], [`EventStore`], and [`AccountStore`]) so that a single
//! handle serves a whole reconciliation pass.
//!
//! [`TaskStore`]: crate::sync::ports::TaskStore
//! [`ProjectStore`]: crate::sync::ports::ProjectStore
//! [`EventStore`]: crate::sync::ports::EventStore
//! [`AccountStore`]: crate::sync::ports::AccountStore

pub mod memory;
pub mod postgres;
