//! Scheduler facade: owns the dispatcher task and its shutdown signal.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::dispatch::Dispatcher;
use crate::registry::JobRegistry;

/// Handle to a running dispatch loop.
///
/// Dropping the handle leaves the dispatcher running; call
/// [`Scheduler::stop`] to halt future dispatch. Runs already in flight are
/// left to finish on their own.
pub struct Scheduler {
    registry: Arc<JobRegistry>,
    shutdown: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Spawn the dispatch loop over `registry`.
    pub fn start(registry: Arc<JobRegistry>) -> Self {
        let (shutdown, cancel) = watch::channel(false);
        let dispatcher = Dispatcher::new(Arc::clone(&registry));
        let handle = tokio::spawn(async move { dispatcher.run(cancel).await });
        Self {
            registry,
            shutdown,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// The registry this scheduler dispatches over.
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Halt future dispatch and wait for the loop to exit.
    ///
    /// Idempotent; a second call returns immediately.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(%err, "dispatcher task ended abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_is_prompt_and_idempotent() {
        let registry = Arc::new(JobRegistry::new(chrono_tz::UTC));
        let scheduler = Scheduler::start(Arc::clone(&registry));

        tokio::time::sleep(Duration::from_millis(50)).await;

        tokio::time::timeout(Duration::from_secs(2), scheduler.stop())
            .await
            .expect("scheduler should stop promptly");
        tokio::time::timeout(Duration::from_secs(2), scheduler.stop())
            .await
            .expect("second stop should return immediately");
    }
}
