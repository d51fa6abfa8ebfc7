//! No-op consumer for deployments without an event stream.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::ConsumerStatus;

/// Stand-in consumer: alive, receiving, never enqueues anything.
///
/// Selected at composition time when no event stream is configured, so
/// health aggregation and shutdown behave identically with or without one.
pub struct NoopConsumer;

impl NoopConsumer {
    pub fn new() -> (Self, Arc<ConsumerStatus>) {
        (Self, ConsumerStatus::new(true))
    }

    /// Park until shutdown.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            match shutdown.changed().await {
                Ok(_) => {
                    if *shutdown.borrow() {
                        info!("No-op consumer shutting down");
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    }
}
