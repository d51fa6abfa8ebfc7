//! The re-sync trigger.
//!
//! On a fixed interval, enumerates every application the daemon manages -
//! queried from the cluster each time, never cached - and enqueues a
//! re-sync deploy request carrying the most recently applied spec. This is
//! the sole mechanism that heals configuration drift and recovers from a
//! previously failed apply without a new external event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cluster::ClusterApi;
use crate::compiler::metadata::{managed_selector, ANNOTATION_SPEC};
use crate::domain::{AppSpec, DeployRequest, ResourceKind, TriggerReason};
use crate::queue::DeployQueue;

pub struct Scheduler {
    queue: Arc<DeployQueue>,
    cluster: Arc<dyn ClusterApi>,
    interval: Duration,
    namespace: Option<String>,
}

impl Scheduler {
    pub fn new(
        queue: Arc<DeployQueue>,
        cluster: Arc<dyn ClusterApi>,
        interval: Duration,
        namespace: Option<String>,
    ) -> Self {
        Self {
            queue,
            cluster,
            interval,
            namespace,
        }
    }

    /// Tick loop. The first tick fires immediately, so drift healing starts
    /// at boot; a missed tick is skipped, not replayed.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(_) => {
                            if *shutdown.borrow() {
                                info!("Scheduler shutting down");
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                _ = ticker.tick() => {
                    self.resync().await;
                }
            }
        }
    }

    /// One re-sync pass: enqueue a request per managed application.
    pub async fn resync(&self) {
        let workloads = match self
            .cluster
            .list(
                ResourceKind::Workload,
                self.namespace.as_deref(),
                &managed_selector(),
            )
            .await
        {
            Ok(workloads) => workloads,
            Err(err) => {
                warn!(error = %err, "Re-sync listing failed, deferring to next tick");
                return;
            }
        };

        let mut enqueued = 0usize;
        for workload in workloads {
            let Some(raw) = workload.metadata.annotations.get(ANNOTATION_SPEC) else {
                debug!(
                    namespace = workload.namespace(),
                    name = workload.name(),
                    "Managed workload has no spec annotation, skipping"
                );
                continue;
            };
            match serde_json::from_str::<AppSpec>(raw) {
                Ok(spec) => {
                    self.queue
                        .enqueue(DeployRequest::new(spec, TriggerReason::ScheduledResync))
                        .await;
                    enqueued += 1;
                }
                Err(err) => {
                    warn!(
                        namespace = workload.namespace(),
                        name = workload.name(),
                        error = %err,
                        "Unparseable spec annotation, skipping"
                    );
                }
            }
        }
        debug!(apps = enqueued, "Re-sync pass complete");
    }
}
