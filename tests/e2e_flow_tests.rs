//! End-to-end flow: event trigger, reconciliation, drift healing.

use std::sync::Arc;
use std::time::Duration;

use deckhand::cluster::ClusterApi;
use deckhand::consumer::{Consumer, StreamEvent};
use deckhand::deployer::Deployer;
use deckhand::domain::ResourceKind;
use deckhand::queue::DeployQueue;
use deckhand::scheduler::Scheduler;
use deckhand::testkit::cluster::InMemoryCluster;
use deckhand::testkit::source::ScriptedEventSource;
use deckhand::testkit::spec::app_spec;
use tokio::sync::watch;

async fn wait_until(cluster: &InMemoryCluster, kind: ResourceKind, present: bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while cluster.contains(kind, "default", "testapp") != present {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {kind} present={present}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn published_spec_is_reconciled_and_drift_is_healed() {
    let cluster = Arc::new(InMemoryCluster::new());
    let queue = Arc::new(DeployQueue::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let deployer = Deployer::new(Arc::clone(&queue), Arc::clone(&cluster) as Arc<dyn ClusterApi>);
    let deployer_task = tokio::spawn(deployer.run(shutdown_rx.clone()));

    // The event stream publishes one spec.
    let source = ScriptedEventSource::new(vec![StreamEvent::Spec(Box::new(app_spec()))]);
    let (consumer, _status) = Consumer::new(Box::new(source), Arc::clone(&queue));
    consumer.run(shutdown_rx.clone()).await;

    wait_until(&cluster, ResourceKind::Workload, true).await;
    wait_until(&cluster, ResourceKind::Service, true).await;
    wait_until(&cluster, ResourceKind::Ingress, true).await;

    // Something deletes the service out-of-band.
    cluster
        .delete(ResourceKind::Service, "default", "testapp")
        .await
        .unwrap();
    wait_until(&cluster, ResourceKind::Service, false).await;

    // The scheduled re-sync recovers the spec from the cluster itself and
    // heals the drift without a new event.
    let scheduler = Scheduler::new(
        Arc::clone(&queue),
        Arc::clone(&cluster) as Arc<dyn ClusterApi>,
        Duration::from_secs(300),
        None,
    );
    scheduler.resync().await;
    wait_until(&cluster, ResourceKind::Service, true).await;

    shutdown_tx.send(true).unwrap();
    deployer_task.await.unwrap();
}
