//! The deployer: consumes deploy requests and reconciles the cluster.
//!
//! Each request runs the state machine
//! `Received -> Compiling -> Applying(kind) -> Succeeded | Failed`.
//! Compilation failures never contact the cluster. Apply failures are
//! isolated per resource kind: a broken ingress definition does not stop
//! the workload and service from being applied.
//!
//! There is no retry within a single attempt - transient transport errors
//! are healed by the scheduler's next re-sync pass.

mod apply;

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::cluster::ClusterApi;
use crate::compiler;
use crate::domain::{DeployRequest, ResourceKind, SpecValidationError};
use crate::queue::DeployQueue;

pub use apply::Applied;

/// Phase of one deploy attempt, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Received,
    Compiling,
    Applying(ResourceKind),
    Succeeded,
    Failed,
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployState::Received => write!(f, "received"),
            DeployState::Compiling => write!(f, "compiling"),
            DeployState::Applying(kind) => write!(f, "applying:{kind}"),
            DeployState::Succeeded => write!(f, "succeeded"),
            DeployState::Failed => write!(f, "failed"),
        }
    }
}

/// One resource kind's failure within an attempt.
#[derive(Debug, Clone)]
pub struct KindFailure {
    pub kind: ResourceKind,
    pub reason: String,
    /// True for transport failures the next re-sync is expected to heal.
    pub retryable: bool,
}

/// Why a deploy attempt failed.
#[derive(Debug, Clone)]
pub enum DeployFailure {
    /// The spec was internally inconsistent; the cluster was not contacted.
    InvalidSpec(SpecValidationError),
    /// One or more resource kinds failed to apply.
    Kinds(Vec<KindFailure>),
}

/// Terminal state of one deploy attempt.
#[derive(Debug, Clone)]
pub enum DeployOutcome {
    Succeeded,
    Failed(DeployFailure),
}

impl DeployOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, DeployOutcome::Succeeded)
    }
}

/// Reconciliation worker: pops the queue, compiles, diffs, applies.
pub struct Deployer {
    queue: Arc<DeployQueue>,
    cluster: Arc<dyn ClusterApi>,
}

impl Deployer {
    pub fn new(queue: Arc<DeployQueue>, cluster: Arc<dyn ClusterApi>) -> Self {
        Self { queue, cluster }
    }

    /// Deploy loop. Shutdown stops picking up new work; a deploy already
    /// started runs to completion.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(_) => {
                            if *shutdown.borrow() {
                                info!("Deployer shutting down");
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                request = self.queue.dequeue() => {
                    let Some(request) = request else {
                        info!("Deploy queue closed");
                        break;
                    };
                    let app = request.app_id();
                    let outcome = self.deploy(&request).await;
                    match &outcome {
                        DeployOutcome::Succeeded => {
                            info!(app = %app, trigger = %request.trigger, "Deploy succeeded");
                        }
                        DeployOutcome::Failed(failure) => {
                            error!(app = %app, trigger = %request.trigger, failure = ?failure, "Deploy failed");
                        }
                    }
                    self.queue.complete(&app);
                }
            }
        }
    }

    /// Run one deploy attempt to its terminal state.
    pub async fn deploy(&self, request: &DeployRequest) -> DeployOutcome {
        let app = request.app_id();
        debug!(app = %app, state = %DeployState::Received, trigger = %request.trigger, "Deploy state");

        debug!(app = %app, state = %DeployState::Compiling, "Deploy state");
        let resources = match compiler::compile(&request.spec) {
            Ok(set) => set,
            Err(validation) => {
                warn!(app = %app, error = %validation, "Spec rejected by compiler");
                debug!(app = %app, state = %DeployState::Failed, "Deploy state");
                return DeployOutcome::Failed(DeployFailure::InvalidSpec(validation));
            }
        };

        let mut failures = Vec::new();
        for resource in resources.resources() {
            debug!(app = %app, state = %DeployState::Applying(resource.kind), "Deploy state");
            match apply::apply(self.cluster.as_ref(), resource).await {
                Ok(applied) => {
                    debug!(
                        app = %app,
                        kind = %resource.kind,
                        name = resource.name(),
                        result = %applied,
                        "Resource applied"
                    );
                }
                Err(err) => {
                    warn!(
                        app = %app,
                        kind = %resource.kind,
                        name = resource.name(),
                        error = %err,
                        "Resource apply failed, continuing with remaining kinds"
                    );
                    failures.push(KindFailure {
                        kind: resource.kind,
                        reason: err.to_string(),
                        retryable: err.is_retryable(),
                    });
                }
            }
        }

        if failures.is_empty() {
            debug!(app = %app, state = %DeployState::Succeeded, "Deploy state");
            DeployOutcome::Succeeded
        } else {
            debug!(app = %app, state = %DeployState::Failed, "Deploy state");
            DeployOutcome::Failed(DeployFailure::Kinds(failures))
        }
    }
}
