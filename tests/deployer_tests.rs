mod support;

use std::sync::Arc;
use std::time::Duration;

use deckhand::cluster::ClusterApi;
use deckhand::deployer::{DeployFailure, DeployOutcome, Deployer};
use deckhand::domain::{DeployRequest, ResourceKind, TriggerReason};
use deckhand::queue::DeployQueue;
use deckhand::testkit::cluster::InMemoryCluster;
use deckhand::testkit::spec::{app_spec, app_spec_no_ports};
use tokio::sync::watch;

use support::deploy_once;

#[tokio::test]
async fn first_deploy_creates_all_produced_kinds() {
    let cluster = Arc::new(InMemoryCluster::new());
    let outcome = deploy_once(&cluster, app_spec()).await;

    assert!(outcome.is_success());
    assert!(cluster.contains(ResourceKind::Workload, "default", "testapp"));
    assert!(cluster.contains(ResourceKind::Service, "default", "testapp"));
    assert!(cluster.contains(ResourceKind::Ingress, "default", "testapp"));
    assert!(!cluster.contains(ResourceKind::Autoscaler, "default", "testapp"));
}

#[tokio::test]
async fn second_pass_with_unchanged_spec_issues_no_mutations() {
    let cluster = Arc::new(InMemoryCluster::new());
    let first = deploy_once(&cluster, app_spec()).await;
    assert!(first.is_success());
    assert!(cluster.mutation_count() > 0);

    cluster.reset_calls();
    let second = deploy_once(&cluster, app_spec()).await;
    assert!(second.is_success(), "idempotent re-apply reports success");
    assert_eq!(
        cluster.mutation_count(),
        0,
        "re-applying an unchanged spec must be a no-op: {:?}",
        cluster.calls()
    );
}

#[tokio::test]
async fn failed_ingress_does_not_block_workload_and_service() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.fail_kind(ResourceKind::Ingress);

    let outcome = deploy_once(&cluster, app_spec()).await;

    let DeployOutcome::Failed(DeployFailure::Kinds(failures)) = &outcome else {
        panic!("expected per-kind failure, got {outcome:?}");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, ResourceKind::Ingress);
    assert!(failures[0].retryable);

    assert!(cluster.contains(ResourceKind::Workload, "default", "testapp"));
    assert!(cluster.contains(ResourceKind::Service, "default", "testapp"));
    assert!(!cluster.contains(ResourceKind::Ingress, "default", "testapp"));
}

#[tokio::test]
async fn transient_failure_heals_on_the_next_pass() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.fail_kind(ResourceKind::Ingress);
    let first = deploy_once(&cluster, app_spec()).await;
    assert!(!first.is_success());

    cluster.heal_kind(ResourceKind::Ingress);
    let second = deploy_once(&cluster, app_spec()).await;
    assert!(second.is_success());
    assert!(cluster.contains(ResourceKind::Ingress, "default", "testapp"));
}

#[tokio::test]
async fn invalid_spec_never_contacts_the_cluster() {
    let cluster = Arc::new(InMemoryCluster::new());
    let spec = app_spec_no_ports().with_ingresses(app_spec().ingresses);

    let outcome = deploy_once(&cluster, spec).await;

    assert!(matches!(
        outcome,
        DeployOutcome::Failed(DeployFailure::InvalidSpec(_))
    ));
    assert!(cluster.calls().is_empty());
}

#[tokio::test]
async fn update_preserves_operator_added_metadata() {
    let cluster = Arc::new(InMemoryCluster::new());
    deploy_once(&cluster, app_spec()).await;

    // An operator stamps the live service out-of-band.
    let mut live = cluster
        .stored(ResourceKind::Service, "default", "testapp")
        .unwrap();
    live.metadata
        .labels
        .insert("operator.example.com/owned".into(), "yes".into());
    cluster.seed(live);

    // A changed spec forces an update; the foreign label must survive.
    deploy_once(&cluster, app_spec().with_replicas(5)).await;
    let stored = cluster
        .stored(ResourceKind::Service, "default", "testapp")
        .unwrap();
    assert_eq!(
        stored.metadata.labels.get("operator.example.com/owned"),
        Some(&"yes".to_string())
    );
}

#[tokio::test]
async fn deleted_resource_is_recreated_on_resync_pass() {
    let cluster = Arc::new(InMemoryCluster::new());
    deploy_once(&cluster, app_spec()).await;

    cluster
        .delete(ResourceKind::Service, "default", "testapp")
        .await
        .unwrap();
    assert!(!cluster.contains(ResourceKind::Service, "default", "testapp"));

    let outcome = deploy_once(&cluster, app_spec()).await;
    assert!(outcome.is_success());
    assert!(cluster.contains(ResourceKind::Service, "default", "testapp"));
}

#[tokio::test]
async fn run_loop_processes_queued_requests_until_shutdown() {
    let cluster = Arc::new(InMemoryCluster::new());
    let queue = Arc::new(DeployQueue::new());
    let deployer = Deployer::new(Arc::clone(&queue), Arc::clone(&cluster) as Arc<dyn ClusterApi>);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(deployer.run(shutdown_rx));

    queue
        .enqueue(DeployRequest::new(app_spec(), TriggerReason::Event))
        .await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cluster.contains(ResourceKind::Workload, "default", "testapp") {
        assert!(tokio::time::Instant::now() < deadline, "deploy never ran");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    shutdown_tx.send(true).unwrap();
    worker.await.unwrap();
}
