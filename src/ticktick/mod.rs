//! `TickTick` snapshot source.
//!
//! Implements the [`SnapshotSource`] port against the `TickTick` sync and
//! open APIs: credential acquisition with session caching, snapshot
//! fetching over the batch endpoint, and dual-path task completion.
//!
//! The HTTP seam is the [`transport::HttpTransport`] trait so that the
//! client logic stays testable without a live endpoint.
//!
//! [`SnapshotSource`]: crate::sync::ports::SnapshotSource

pub mod client;
pub mod config;
pub mod credentials;
pub mod transport;
mod wire;

pub use client::TicktickClient;
pub use config::TicktickConfig;
pub use credentials::SessionCache;
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, RetryPolicy,
    TransportError, with_retry,
};

#[cfg(test)]
mod tests;
