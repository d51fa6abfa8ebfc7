//! The deploy queue: hands requests from the triggers to the deployer with
//! at-most-one-in-flight-or-queued-per-application semantics.
//!
//! Enqueuing a request for an application that already has a queued entry
//! coalesces - the newer request replaces it, so the deployer always sees
//! the latest spec. A request being applied is never interrupted: a new
//! request for the same application waits queued until the in-flight apply
//! completes, and at most one apply per application runs at a time.
//!
//! Unbounded by default. With a bounded capacity, enqueuing a *new*
//! application awaits space; coalescing replacement never blocks because it
//! does not grow the queue.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::domain::{AppId, DeployRequest};

#[derive(Default)]
struct QueueState {
    queued: HashMap<AppId, DeployRequest>,
    order: VecDeque<AppId>,
    in_flight: HashSet<AppId>,
    closed: bool,
}

/// Shared deploy queue, created once and passed to exactly the components
/// that need it: deployer (consumer side), consumer and scheduler (producer
/// side).
pub struct DeployQueue {
    state: Mutex<QueueState>,
    capacity: Option<usize>,
    work_available: Notify,
    space_available: Notify,
}

impl DeployQueue {
    /// Unbounded queue; enqueue never blocks.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            capacity: None,
            work_available: Notify::new(),
            space_available: Notify::new(),
        }
    }

    /// Bounded queue; enqueuing a new application awaits space.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::new()
        }
    }

    /// Hand a request to the deployer, coalescing per application.
    pub async fn enqueue(&self, request: DeployRequest) {
        let mut request = Some(request);
        loop {
            let space = self.space_available.notified();
            tokio::pin!(space);
            space.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.closed {
                    return;
                }
                let incoming = match request.take() {
                    Some(r) => r,
                    None => return,
                };
                let app = incoming.app_id();
                if state.queued.contains_key(&app) {
                    // Coalesce: latest spec wins, position in line is kept.
                    state.queued.insert(app, incoming);
                    return;
                }
                if self.capacity.map_or(true, |cap| state.order.len() < cap) {
                    state.order.push_back(app.clone());
                    state.queued.insert(app, incoming);
                    self.work_available.notify_one();
                    return;
                }
                request = Some(incoming);
            }
            space.await;
        }
    }

    /// Take the next request whose application is not currently in flight.
    ///
    /// Blocks until one is available. Returns `None` once the queue is
    /// closed; remaining entries are deliberately not drained.
    pub async fn dequeue(&self) -> Option<DeployRequest> {
        loop {
            let work = self.work_available.notified();
            tokio::pin!(work);
            work.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.closed {
                    return None;
                }
                let eligible = state
                    .order
                    .iter()
                    .position(|app| !state.in_flight.contains(app));
                if let Some(position) = eligible {
                    if let Some(app) = state.order.remove(position) {
                        if let Some(request) = state.queued.remove(&app) {
                            state.in_flight.insert(app);
                            self.space_available.notify_waiters();
                            return Some(request);
                        }
                    }
                }
            }
            work.await;
        }
    }

    /// Mark an application's apply as finished, making a request that was
    /// deferred while it ran eligible for dequeue.
    pub fn complete(&self, app: &AppId) {
        let mut state = self.state.lock();
        state.in_flight.remove(app);
        if state.queued.contains_key(app) {
            self.work_available.notify_one();
        }
    }

    /// Stop handing out work. Producers become no-ops, `dequeue` returns
    /// `None`; an apply already in flight is unaffected.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.work_available.notify_waiters();
        self.space_available.notify_waiters();
        // Wake a dequeuer parked on a stored permit as well.
        self.work_available.notify_one();
    }

    /// Number of queued (not in-flight) requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeployQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TriggerReason;
    use crate::testkit::spec::app_spec;

    fn request(replicas: u32) -> DeployRequest {
        DeployRequest::new(app_spec().with_replicas(replicas), TriggerReason::Event)
    }

    fn other_app_request() -> DeployRequest {
        let mut spec = app_spec();
        spec.name = "otherapp".into();
        DeployRequest::new(spec, TriggerReason::Event)
    }

    #[tokio::test]
    async fn enqueue_then_dequeue_round_trips() {
        let queue = DeployQueue::new();
        queue.enqueue(request(3)).await;
        let out = queue.dequeue().await.unwrap();
        assert_eq!(out.spec.replicas, 3);
    }

    #[tokio::test]
    async fn second_enqueue_for_same_app_coalesces_to_latest() {
        let queue = DeployQueue::new();
        queue.enqueue(request(1)).await;
        queue.enqueue(request(2)).await;
        assert_eq!(queue.len(), 1);
        let out = queue.dequeue().await.unwrap();
        assert_eq!(out.spec.replicas, 2);
    }

    #[tokio::test]
    async fn different_apps_do_not_coalesce() {
        let queue = DeployQueue::new();
        queue.enqueue(request(1)).await;
        queue.enqueue(other_app_request()).await;
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn in_flight_app_is_not_dequeued_again() {
        let queue = DeployQueue::new();
        queue.enqueue(request(1)).await;
        let first = queue.dequeue().await.unwrap();

        // Re-enqueued while in flight: queued but not eligible yet.
        queue.enqueue(request(2)).await;
        assert_eq!(queue.len(), 1);
        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            queue.dequeue(),
        )
        .await;
        assert!(pending.is_err(), "dequeue should block while in flight");

        queue.complete(&first.app_id());
        let second = queue.dequeue().await.unwrap();
        assert_eq!(second.spec.replicas, 2);
    }

    #[tokio::test]
    async fn dequeue_skips_in_flight_app_but_serves_others() {
        let queue = DeployQueue::new();
        queue.enqueue(request(1)).await;
        let first = queue.dequeue().await.unwrap();
        queue.enqueue(request(2)).await;
        queue.enqueue(other_app_request()).await;

        let other = queue.dequeue().await.unwrap();
        assert_eq!(other.spec.name, "otherapp");
        queue.complete(&first.app_id());
    }

    #[tokio::test]
    async fn close_makes_dequeue_return_none() {
        let queue = DeployQueue::new();
        queue.enqueue(request(1)).await;
        queue.close();
        assert!(queue.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn enqueue_after_close_is_a_noop() {
        let queue = DeployQueue::new();
        queue.close();
        queue.enqueue(request(1)).await;
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn bounded_queue_blocks_new_app_until_space() {
        let queue = std::sync::Arc::new(DeployQueue::bounded(1));
        queue.enqueue(request(1)).await;

        // Coalescing replacement does not block even at capacity.
        queue.enqueue(request(2)).await;

        let blocked = {
            let queue = queue.clone();
            tokio::spawn(async move {
                queue.enqueue(other_app_request()).await;
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!blocked.is_finished());

        let first = queue.dequeue().await.unwrap();
        assert_eq!(first.spec.replicas, 2);
        blocked.await.unwrap();
        assert_eq!(queue.len(), 1);
    }
}
