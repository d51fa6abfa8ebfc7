//! Composition root and runtime lifecycle.
//!
//! Constructs the components in dependency order and passes collaborators
//! through constructors - the deploy queue is created once here and handed
//! to exactly the three loops that need it. No ambient state, no runtime
//! lookup.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use crate::adapter::{HttpClusterApi, WsEventSource};
use crate::cluster::ClusterApi;
use crate::compiler::metadata::managed_selector;
use crate::config::Config;
use crate::consumer::noop::NoopConsumer;
use crate::consumer::{Consumer, ConsumerStatus};
use crate::deployer::Deployer;
use crate::domain::ResourceKind;
use crate::error::Result;
use crate::health::HealthCheck;
use crate::queue::DeployQueue;
use crate::scheduler::Scheduler;
use crate::web::{self, WebState};

use super::supervisor::TaskHandle;

/// Main application entrypoint.
pub struct App;

impl App {
    /// Run without external shutdown control.
    pub async fn run(config: Config) -> Result<()> {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        run_with_shutdown(config, shutdown_rx).await
    }

    /// Run with an externally controlled shutdown signal.
    pub async fn run_with_shutdown(
        config: Config,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        run_with_shutdown(config, shutdown).await
    }
}

async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(
        cluster = %config.cluster.api_url,
        namespace = config.cluster.namespace.as_deref().unwrap_or("<all>"),
        resync_interval_secs = config.resync.interval_secs,
        "Starting deckhand"
    );

    let cluster: Arc<dyn ClusterApi> = Arc::new(HttpClusterApi::new(&config.cluster)?);

    // Startup probe: an unreachable cluster is fatal.
    cluster
        .list(
            ResourceKind::Workload,
            config.cluster.namespace.as_deref(),
            &managed_selector(),
        )
        .await?;
    info!(backend = cluster.cluster_name(), "Cluster reachable");

    let queue = Arc::new(match config.queue.capacity {
        Some(capacity) => DeployQueue::bounded(capacity),
        None => DeployQueue::new(),
    });

    let deployer = Deployer::new(Arc::clone(&queue), Arc::clone(&cluster));
    let deployer_task = TaskHandle::spawn("deployer", {
        let shutdown = shutdown.clone();
        async move { deployer.run(shutdown).await }
    });

    let (consumer_task, consumer_status) = spawn_consumer(&config, &queue, &shutdown);

    let scheduler = Scheduler::new(
        Arc::clone(&queue),
        Arc::clone(&cluster),
        Duration::from_secs(config.resync.interval_secs),
        config.cluster.namespace.clone(),
    );
    let scheduler_task = TaskHandle::spawn("scheduler", {
        let shutdown = shutdown.clone();
        async move { scheduler.run(shutdown).await }
    });

    let health = HealthCheck::new(
        deployer_task.liveness(),
        consumer_task.liveness(),
        scheduler_task.liveness(),
        consumer_status,
    );

    let state = Arc::new(WebState {
        health,
        queue: Arc::clone(&queue),
    });

    // A port we cannot bind is fatal at startup.
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http.port)).await?;
    info!(port = config.http.port, "HTTP front-end listening");

    let mut serve_shutdown = shutdown.clone();
    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(async move {
            let _ = serve_shutdown.changed().await;
        })
        .await?;

    // Stop handing out new work; the loops drain and exit on the shutdown
    // signal that ended the server.
    queue.close();
    for task in [deployer_task, consumer_task, scheduler_task] {
        task.join().await;
    }
    info!("deckhand stopped");
    Ok(())
}

fn spawn_consumer(
    config: &Config,
    queue: &Arc<DeployQueue>,
    shutdown: &watch::Receiver<bool>,
) -> (TaskHandle, Arc<ConsumerStatus>) {
    match &config.event_stream {
        Some(stream) => {
            let source = WsEventSource::new(stream.ws_url.clone(), stream.reconnect.clone());
            let (consumer, status) = Consumer::new(Box::new(source), Arc::clone(queue));
            let shutdown = shutdown.clone();
            (
                TaskHandle::spawn("consumer", async move { consumer.run(shutdown).await }),
                status,
            )
        }
        None => {
            info!("No event stream configured, using no-op consumer");
            let (noop, status) = NoopConsumer::new();
            let shutdown = shutdown.clone();
            (
                TaskHandle::spawn("consumer", async move { noop.run(shutdown).await }),
                status,
            )
        }
    }
}
