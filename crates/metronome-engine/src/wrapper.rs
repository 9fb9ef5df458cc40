//! Per-job execution wrapper and its status machine.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::history::{RunHistory, RunOutcome, RunRecord};
use crate::job::Job;
use crate::runid::RunIdGenerator;

/// Execution state of a wrapped job.
///
/// `Ready` means never yet run; after any completed run the wrapper is
/// `Sleeping` until its next fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunStatus {
    Ready = 0,
    Running = 1,
    Sleeping = 2,
}

impl RunStatus {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => RunStatus::Ready,
            1 => RunStatus::Running,
            _ => RunStatus::Sleeping,
        }
    }

    /// Status label as rendered in reports.
    pub fn label(self) -> &'static str {
        match self {
            RunStatus::Ready => "Ready(First)",
            RunStatus::Running => "Running",
            RunStatus::Sleeping => "Sleeping",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pairs one job with its schedule, status, and run history.
///
/// Created by the registry at registration time and kept for the process
/// lifetime. All state mutation happens through [`ExecutionWrapper::run`].
pub struct ExecutionWrapper {
    job: Arc<dyn Job>,
    schedule: Schedule,
    timezone: Tz,
    allow_concurrent: bool,
    status: AtomicU8,
    prev_start: Mutex<Option<DateTime<Utc>>>,
    history: RunHistory,
    ids: Arc<RunIdGenerator>,
}

impl ExecutionWrapper {
    pub(crate) fn new(
        job: Arc<dyn Job>,
        schedule: Schedule,
        timezone: Tz,
        history_capacity: usize,
        ids: Arc<RunIdGenerator>,
    ) -> Self {
        let allow_concurrent = job.allow_concurrent();
        Self {
            job,
            schedule,
            timezone,
            allow_concurrent,
            status: AtomicU8::new(RunStatus::Ready as u8),
            prev_start: Mutex::new(None),
            history: RunHistory::new(history_capacity),
            ids,
        }
    }

    /// Job name as supplied by its source.
    pub fn name(&self) -> &str {
        self.job.name()
    }

    /// Job description.
    pub fn description(&self) -> &str {
        self.job.description()
    }

    /// Whether overlapping runs are allowed.
    pub fn allow_concurrent(&self) -> bool {
        self.allow_concurrent
    }

    /// Current execution status.
    pub fn status(&self) -> RunStatus {
        RunStatus::from_raw(self.status.load(Ordering::SeqCst))
    }

    /// Start time of the most recent run, absent until the first run.
    pub fn previous_start(&self) -> Option<DateTime<Utc>> {
        *self.prev_start.lock()
    }

    /// Copy of the retained run records, most recent first.
    pub fn history(&self) -> Vec<RunRecord> {
        self.history.snapshot()
    }

    /// Next fire instant strictly after `after`, computed in the configured
    /// time zone. `None` when the schedule has no upcoming occurrence.
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.timezone))
            .next()
            .map(|at| at.with_timezone(&Utc))
    }

    /// Format an instant in the wrapper's time zone for reporting.
    pub fn format_local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// Attempt the Ready/Sleeping -> Running transition.
    ///
    /// The check and the write are one compare-and-swap: two near
    /// simultaneous fires of a non-concurrent job cannot both pass.
    fn try_begin(&self) -> bool {
        if self.allow_concurrent {
            self.status.store(RunStatus::Running as u8, Ordering::SeqCst);
            return true;
        }
        let mut current = self.status.load(Ordering::SeqCst);
        loop {
            if current == RunStatus::Running as u8 {
                return false;
            }
            match self.status.compare_exchange(
                current,
                RunStatus::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Execute the job once and record the outcome.
    ///
    /// A fire that finds a non-concurrent job still running is dropped
    /// entirely: no record is written and no state changes. Otherwise the
    /// job body runs on the blocking pool, and the wrapper returns to
    /// `Sleeping` on every exit path, including failure and panic.
    pub async fn run(&self) {
        let instance_id = self.ids.next_id();
        debug!(job = self.name(), instance_id, "run starting");

        if !self.try_begin() {
            warn!(
                job = self.name(),
                instance_id, "previous run still in flight, fire dropped"
            );
            return;
        }

        let start = Utc::now();
        let job = Arc::clone(&self.job);
        let result = tokio::task::spawn_blocking(move || job.run()).await;
        let completion = Utc::now();

        let (outcome, error) = match result {
            Ok(Ok(())) => (RunOutcome::Success, None),
            Ok(Err(err)) => (RunOutcome::Failed, Some(err.to_string())),
            Err(join_err) => (RunOutcome::Failed, Some(format!("job panicked: {join_err}"))),
        };
        if let Some(reason) = &error {
            warn!(job = self.name(), instance_id, %reason, "run failed");
        }

        self.history.add(RunRecord {
            instance_id,
            start_time: start,
            completion_time: completion,
            elapsed_secs: (completion - start).num_seconds(),
            outcome,
            error,
        });
        *self.prev_start.lock() = Some(start);
        self.status.store(RunStatus::Sleeping as u8, Ordering::SeqCst);
        debug!(job = self.name(), instance_id, "run finished");
    }
}

impl fmt::Debug for ExecutionWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionWrapper")
            .field("job", &self.name())
            .field("status", &self.status())
            .field("allow_concurrent", &self.allow_concurrent)
            .finish()
    }
}

#[cfg(test)]
#[path = "wrapper_tests.rs"]
mod tests;
