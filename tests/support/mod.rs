#![allow(dead_code)]

use std::sync::Arc;

use deckhand::cluster::ClusterApi;
use deckhand::deployer::{DeployOutcome, Deployer};
use deckhand::domain::{AppSpec, DeployRequest, TriggerReason};
use deckhand::queue::DeployQueue;
use deckhand::testkit::cluster::InMemoryCluster;

/// Run a single deploy attempt against the given fake cluster.
pub async fn deploy_once(cluster: &Arc<InMemoryCluster>, spec: AppSpec) -> DeployOutcome {
    let queue = Arc::new(DeployQueue::new());
    let deployer = Deployer::new(queue, Arc::clone(cluster) as Arc<dyn ClusterApi>);
    deployer
        .deploy(&DeployRequest::new(spec, TriggerReason::Event))
        .await
}
