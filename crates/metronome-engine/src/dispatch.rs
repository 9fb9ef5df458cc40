//! Dispatch loop that fires due jobs at their scheduled instants.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info};

use crate::registry::JobRegistry;

/// Upper bound on a single dispatcher sleep. Jobs registered after the loop
/// computed its wakeup are picked up within this window.
const MAX_SLEEP: Duration = Duration::from_secs(30);

/// Drives execution of every job in a [`JobRegistry`].
///
/// One dispatch authority computes the minimum next fire time across all
/// wrappers, sleeps until due, then spawns each due wrapper's run as its own
/// task. The loop itself never blocks inside a job.
pub struct Dispatcher {
    registry: Arc<JobRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }

    /// Run until the cancellation channel flips.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!("dispatcher started");
        loop {
            let now = Utc::now();
            let upcoming: Vec<_> = self
                .registry
                .wrappers()
                .into_iter()
                .filter_map(|wrapper| {
                    wrapper.next_fire(now).map(|at| (wrapper, at))
                })
                .collect();

            let sleep_for = upcoming
                .iter()
                .map(|(_, at)| *at)
                .min()
                .map(|earliest| (earliest - now).to_std().unwrap_or(Duration::ZERO))
                .unwrap_or(MAX_SLEEP)
                .min(MAX_SLEEP);

            tokio::select! {
                _ = time::sleep(sleep_for) => {}
                _ = cancel.changed() => {
                    info!("dispatcher shutting down");
                    break;
                }
            }

            let fired = Utc::now();
            for (wrapper, at) in upcoming {
                if at <= fired {
                    debug!(job = wrapper.name(), "job due, dispatching");
                    tokio::spawn(async move { wrapper.run().await });
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
