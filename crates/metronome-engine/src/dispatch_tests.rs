//! Tests for the dispatch loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::error::JobError;
use crate::job::Job;

struct TickingJob {
    runs: AtomicUsize,
}

impl Job for TickingJob {
    fn name(&self) -> &str {
        "ticker"
    }

    fn description(&self) -> &str {
        "counts its runs"
    }

    fn run(&self) -> Result<(), JobError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_due_job_fires() {
    let registry = Arc::new(JobRegistry::new(chrono_tz::UTC));
    let job = Arc::new(TickingJob {
        runs: AtomicUsize::new(0),
    });
    // Every second.
    registry
        .register("* * * * * *", Arc::clone(&job) as Arc<dyn Job>)
        .unwrap();

    let (shutdown, cancel) = watch::channel(false);
    let dispatcher = Dispatcher::new(Arc::clone(&registry));
    let loop_task = tokio::spawn(async move { dispatcher.run(cancel).await });

    // Two full schedule periods is enough for at least one fire.
    tokio::time::sleep(Duration::from_millis(2200)).await;
    shutdown.send(true).unwrap();
    loop_task.await.unwrap();

    assert!(job.runs.load(Ordering::SeqCst) >= 1);
    let wrapper = registry.get("ticker").unwrap();
    assert!(!wrapper.history().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shutdown_is_prompt_with_empty_registry() {
    let registry = Arc::new(JobRegistry::new(chrono_tz::UTC));
    let (shutdown, cancel) = watch::channel(false);
    let dispatcher = Dispatcher::new(registry);
    let loop_task = tokio::spawn(async move { dispatcher.run(cancel).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.send(true).unwrap();

    // An empty registry sleeps MAX_SLEEP at a time; cancellation must still
    // interrupt the wait immediately.
    tokio::time::timeout(Duration::from_secs(2), loop_task)
        .await
        .expect("dispatcher should shut down promptly")
        .expect("dispatcher task should not panic");
}
