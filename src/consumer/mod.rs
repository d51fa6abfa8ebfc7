//! The event-stream trigger.
//!
//! A [`Consumer`] reads spec-published events from an [`EventSource`] and
//! turns them into deploy requests. Liveness (the loop is running) and
//! receiving (messages are actually flowing) are distinct signals: a
//! consumer that lost its upstream connection is alive but stalled, and the
//! health check reports that separately.
//!
//! Deployments without an event stream use [`noop::NoopConsumer`], which is
//! alive, receiving, and never enqueues - the rest of the system behaves
//! identically either way.

pub mod noop;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::{AppSpec, DeployRequest, TriggerReason};
use crate::queue::DeployQueue;

/// One message from the event stream.
#[derive(Debug)]
pub enum StreamEvent {
    /// A new spec was published for an application.
    Spec(Box<AppSpec>),
    /// The upstream connection dropped; the source will reconnect.
    Disconnected { reason: String },
}

/// Source of deploy events. The wire protocol behind it is the adapter's
/// business; the consumer only sees parsed events.
#[async_trait]
pub trait EventSource: Send {
    /// Establish the upstream connection.
    async fn connect(&mut self) -> crate::error::Result<()>;

    /// Next event, or `None` when the source has permanently ended.
    async fn next_event(&mut self) -> Option<StreamEvent>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}

/// Shared receiving signal, polled by the health check.
#[derive(Debug)]
pub struct ConsumerStatus {
    receiving: AtomicBool,
}

impl ConsumerStatus {
    pub(crate) fn new(receiving: bool) -> Arc<Self> {
        Arc::new(Self {
            receiving: AtomicBool::new(receiving),
        })
    }

    #[must_use]
    pub fn is_receiving(&self) -> bool {
        self.receiving.load(Ordering::Relaxed)
    }

    fn set_receiving(&self, receiving: bool) {
        self.receiving.store(receiving, Ordering::Relaxed);
    }
}

/// Event-driven trigger: pushes one deploy request per published spec.
pub struct Consumer {
    source: Box<dyn EventSource>,
    queue: Arc<DeployQueue>,
    status: Arc<ConsumerStatus>,
}

impl Consumer {
    pub fn new(source: Box<dyn EventSource>, queue: Arc<DeployQueue>) -> (Self, Arc<ConsumerStatus>) {
        let status = ConsumerStatus::new(false);
        (
            Self {
                source,
                queue,
                status: status.clone(),
            },
            status,
        )
    }

    /// Consume events until shutdown or the source ends.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        if let Err(err) = self.source.connect().await {
            warn!(source = self.source.source_name(), error = %err, "Event source connect failed");
            return;
        }
        self.status.set_receiving(true);
        info!(source = self.source.source_name(), "Consumer connected");

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(_) => {
                            if *shutdown.borrow() {
                                info!("Consumer shutting down");
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                event = self.source.next_event() => {
                    match event {
                        Some(StreamEvent::Spec(spec)) => {
                            self.status.set_receiving(true);
                            let app = spec.app_id();
                            info!(app = %app, deployment_id = %spec.deployment_id, "Spec published");
                            self.queue
                                .enqueue(DeployRequest::new(*spec, TriggerReason::Event))
                                .await;
                        }
                        Some(StreamEvent::Disconnected { reason }) => {
                            self.status.set_receiving(false);
                            warn!(reason = %reason, "Event stream disconnected");
                        }
                        None => {
                            self.status.set_receiving(false);
                            warn!("Event stream ended");
                            break;
                        }
                    }
                }
            }
        }
    }
}
