//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`spec`] - Canonical [`AppSpec`](crate::domain::AppSpec) fixtures:
//!   http app, tcp-only app, multi-port app, portless exec-check app.
//! - [`cluster`] - [`InMemoryCluster`](cluster::InMemoryCluster): recording
//!   fake [`ClusterApi`](crate::cluster::ClusterApi) with failure injection.
//! - [`source`] - [`ScriptedEventSource`](source::ScriptedEventSource) for
//!   consumer tests.

pub mod cluster;
pub mod source;
pub mod spec;

use std::sync::Arc;

use crate::consumer::ConsumerStatus;

/// A consumer status pinned to the given receiving flag.
pub fn consumer_status(receiving: bool) -> Arc<ConsumerStatus> {
    ConsumerStatus::new(receiving)
}
