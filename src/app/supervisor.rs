//! Supervised background tasks.
//!
//! Every background loop is spawned through [`TaskHandle::spawn`], which
//! couples the task to a shared [`Liveness`] flag. The flag drops to dead
//! when the loop ends for any reason - clean return, error, or panic - so
//! an unexpected loop death surfaces through the health check and the
//! external supervisor restarts the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::error;

/// Cloneable liveness flag for one supervised task.
#[derive(Debug, Clone)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
}

impl Liveness {
    fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    fn mark_dead(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Fixed-value flag for health aggregation tests.
    #[cfg(any(test, feature = "testkit"))]
    #[must_use]
    pub fn stub(alive: bool) -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(alive)),
        }
    }
}

/// Flips the liveness flag when the task's future is dropped, which also
/// covers panics unwinding through the task.
struct LivenessGuard(Liveness);

impl Drop for LivenessGuard {
    fn drop(&mut self) {
        self.0.mark_dead();
    }
}

/// Handle to one supervised background task.
pub struct TaskHandle {
    name: &'static str,
    liveness: Liveness,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawn a supervised task.
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let liveness = Liveness::new();
        let guard = LivenessGuard(liveness.clone());
        let join = tokio::spawn(async move {
            let _guard = guard;
            future.await;
        });
        Self {
            name,
            liveness,
            join,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The task's liveness flag, shareable with the health check.
    #[must_use]
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Wait for the task to finish.
    pub async fn join(self) {
        if let Err(err) = self.join.await {
            error!(task = self.name, error = %err, "Background task join failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn task_is_alive_while_running() {
        let handle = TaskHandle::spawn("parked", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn liveness_drops_when_task_returns() {
        let handle = TaskHandle::spawn("short", async {});
        let liveness = handle.liveness();
        handle.join().await;
        assert!(!liveness.is_alive());
    }

    #[tokio::test]
    async fn liveness_drops_when_task_panics() {
        let handle = TaskHandle::spawn("panicking", async {
            panic!("boom");
        });
        let liveness = handle.liveness();
        let _ = handle.join.await;
        assert!(!liveness.is_alive());
    }
}
