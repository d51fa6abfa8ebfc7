//! Deckhand - Continuous deployment daemon for container clusters.
//!
//! Deckhand holds a declarative description of each application (an
//! [`AppSpec`](domain::AppSpec)) and keeps the cluster's live state converging
//! on it. Desired-state changes arrive from two triggers - an external event
//! stream publishing new specs, and a periodic re-sync timer - and both fan
//! into the same reconciliation engine.
//!
//! # Architecture
//!
//! - **`domain`** - Immutable spec model and typed cluster resources
//! - **`compiler`** - Pure translation of an `AppSpec` into a `ResourceSet`
//! - **`cluster`** - The `ClusterApi` port consumed by deployer and scheduler
//! - **`queue`** - Deploy queue with single-flight-per-application coalescing
//! - **`deployer`** - Reconciliation loop: compile, diff, apply per kind
//! - **`consumer`** - Event-stream trigger (websocket or no-op)
//! - **`scheduler`** - Periodic re-sync trigger that heals drift
//! - **`health`** - Liveness aggregation for external supervision
//! - **`adapter`** - Concrete cluster/event-stream implementations
//! - **`web`** - HTTP front-end: liveness endpoint and manual deploy trigger
//! - **`app`** - Composition root and task supervision
//!
//! # Example
//!
//! ```no_run
//! use deckhand::app::App;
//! use deckhand::config::Config;
//!
//! # async fn run() -> deckhand::error::Result<()> {
//! let config = Config::load("deckhand.toml")?;
//! config.logging.init();
//! App::run(config).await
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod cluster;
pub mod compiler;
pub mod config;
pub mod consumer;
pub mod deployer;
pub mod domain;
pub mod error;
pub mod health;
pub mod queue;
pub mod scheduler;
pub mod web;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
