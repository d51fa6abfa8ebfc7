//! Liveness aggregation for external supervision.

use std::sync::Arc;

use crate::app::Liveness;
use crate::consumer::ConsumerStatus;

/// Aggregates the three background loops into one boolean for the
/// supervisor's liveness probe.
///
/// Pure read: polled by the HTTP front-end, never by the components
/// themselves. A consumer that is alive but not receiving messages makes
/// the daemon unhealthy, independent of the other loops.
#[derive(Clone)]
pub struct HealthCheck {
    deployer: Liveness,
    consumer: Liveness,
    scheduler: Liveness,
    consumer_status: Arc<ConsumerStatus>,
}

impl HealthCheck {
    pub fn new(
        deployer: Liveness,
        consumer: Liveness,
        scheduler: Liveness,
        consumer_status: Arc<ConsumerStatus>,
    ) -> Self {
        Self {
            deployer,
            consumer,
            scheduler,
            consumer_status,
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.deployer.is_alive()
            && self.consumer.is_alive()
            && self.scheduler.is_alive()
            && self.consumer_status.is_receiving()
    }
}
