use std::sync::Arc;

use deckhand::app::Liveness;
use deckhand::domain::TriggerReason;
use deckhand::health::HealthCheck;
use deckhand::queue::DeployQueue;
use deckhand::testkit::consumer_status;
use deckhand::testkit::spec::app_spec;
use deckhand::web::{router, WebState};

async fn serve(health: HealthCheck, queue: Arc<DeployQueue>) -> (String, tokio::task::JoinHandle<()>) {
    let state = Arc::new(WebState { health, queue });
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    (format!("http://{addr}"), task)
}

fn healthy() -> HealthCheck {
    HealthCheck::new(
        Liveness::stub(true),
        Liveness::stub(true),
        Liveness::stub(true),
        consumer_status(true),
    )
}

#[tokio::test]
async fn healthz_reflects_the_aggregated_signal() {
    let (base, task) = serve(healthy(), Arc::new(DeployQueue::new())).await;
    let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
    task.abort();

    let unhealthy = HealthCheck::new(
        Liveness::stub(false),
        Liveness::stub(true),
        Liveness::stub(true),
        consumer_status(true),
    );
    let (base, task) = serve(unhealthy, Arc::new(DeployQueue::new())).await;
    let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(response.status(), 503);
    task.abort();
}

#[tokio::test]
async fn manual_deploy_trigger_enqueues_an_event_request() {
    let queue = Arc::new(DeployQueue::new());
    let (base, task) = serve(healthy(), Arc::clone(&queue)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/deploy"))
        .json(&app_spec())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let request = queue.dequeue().await.expect("request enqueued");
    assert_eq!(request.trigger, TriggerReason::Event);
    assert_eq!(request.spec.name, "testapp");
    task.abort();
}

#[tokio::test]
async fn malformed_deploy_body_is_rejected() {
    let queue = Arc::new(DeployQueue::new());
    let (base, task) = serve(healthy(), Arc::clone(&queue)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/deploy"))
        .header("content-type", "application/json")
        .body("{\"name\": 42}")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert!(queue.is_empty());
    task.abort();
}
