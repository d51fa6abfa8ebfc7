mod support;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use deckhand::cluster::ClusterApi;
use deckhand::compiler::metadata;
use deckhand::domain::resource::{ObjectMeta, Resource, ResourcePayload};
use deckhand::domain::{ResourceKind, TriggerReason};
use deckhand::queue::DeployQueue;
use deckhand::scheduler::Scheduler;
use deckhand::testkit::cluster::InMemoryCluster;
use deckhand::testkit::spec::app_spec;

use support::deploy_once;

fn scheduler(queue: &Arc<DeployQueue>, cluster: &Arc<InMemoryCluster>) -> Scheduler {
    Scheduler::new(
        Arc::clone(queue),
        Arc::clone(cluster) as Arc<dyn ClusterApi>,
        Duration::from_secs(300),
        None,
    )
}

#[tokio::test]
async fn resync_enqueues_the_last_applied_spec() {
    let cluster = Arc::new(InMemoryCluster::new());
    deploy_once(&cluster, app_spec()).await;

    let queue = Arc::new(DeployQueue::new());
    scheduler(&queue, &cluster).resync().await;

    let request = queue.dequeue().await.expect("one request enqueued");
    assert_eq!(request.trigger, TriggerReason::ScheduledResync);
    assert_eq!(request.spec, app_spec());
    assert!(queue.is_empty());
}

#[tokio::test]
async fn unmanaged_or_unannotated_workloads_are_skipped() {
    let cluster = Arc::new(InMemoryCluster::new());

    // Managed label but no spec annotation.
    let mut labels = BTreeMap::new();
    labels.insert(
        metadata::LABEL_MANAGED_BY.to_string(),
        metadata::MANAGED_BY.to_string(),
    );
    cluster.seed(Resource {
        kind: ResourceKind::Workload,
        metadata: ObjectMeta {
            name: "legacy".into(),
            namespace: "default".into(),
            labels,
            annotations: BTreeMap::new(),
        },
        payload: ResourcePayload::ConfigMap(BTreeMap::new()),
    });

    // Not managed by this daemon at all.
    cluster.seed(Resource {
        kind: ResourceKind::Workload,
        metadata: ObjectMeta {
            name: "foreign".into(),
            namespace: "default".into(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        },
        payload: ResourcePayload::ConfigMap(BTreeMap::new()),
    });

    let queue = Arc::new(DeployQueue::new());
    scheduler(&queue, &cluster).resync().await;
    assert!(queue.is_empty());
}

#[tokio::test]
async fn corrupt_spec_annotation_does_not_abort_the_pass() {
    let cluster = Arc::new(InMemoryCluster::new());
    deploy_once(&cluster, app_spec()).await;

    let mut corrupt = cluster
        .stored(ResourceKind::Workload, "default", "testapp")
        .unwrap();
    corrupt.metadata.name = "broken".into();
    corrupt
        .metadata
        .annotations
        .insert(metadata::ANNOTATION_SPEC.to_string(), "{not json".into());
    cluster.seed(corrupt);

    let queue = Arc::new(DeployQueue::new());
    scheduler(&queue, &cluster).resync().await;

    // The healthy app is still enqueued.
    let request = queue.dequeue().await.expect("healthy app enqueued");
    assert_eq!(request.spec.name, "testapp");
    assert!(queue.is_empty());
}

#[tokio::test]
async fn namespace_scope_limits_the_pass() {
    let cluster = Arc::new(InMemoryCluster::new());
    deploy_once(&cluster, app_spec()).await;

    let mut other = app_spec();
    other.namespace = "staging".into();
    deploy_once(&cluster, other).await;

    let queue = Arc::new(DeployQueue::new());
    Scheduler::new(
        Arc::clone(&queue),
        Arc::clone(&cluster) as Arc<dyn ClusterApi>,
        Duration::from_secs(300),
        Some("staging".into()),
    )
    .resync()
    .await;

    let request = queue.dequeue().await.expect("staging app enqueued");
    assert_eq!(request.spec.namespace, "staging");
    assert!(queue.is_empty());
}

#[tokio::test]
async fn resync_coalesces_with_a_pending_event_request() {
    let cluster = Arc::new(InMemoryCluster::new());
    deploy_once(&cluster, app_spec()).await;

    let queue = Arc::new(DeployQueue::new());
    queue
        .enqueue(deckhand::domain::DeployRequest::new(
            app_spec().with_replicas(9),
            TriggerReason::Event,
        ))
        .await;

    scheduler(&queue, &cluster).resync().await;
    assert_eq!(queue.len(), 1, "same app coalesces to one entry");

    let request = queue.dequeue().await.unwrap();
    assert_eq!(request.trigger, TriggerReason::ScheduledResync);
}
