//! Case-insensitive job registry.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ScheduleError;
use crate::history::{RunHistory, RunRecord};
use crate::job::Job;
use crate::runid::RunIdGenerator;
use crate::wrapper::ExecutionWrapper;

/// Mapping from lower-cased job name to its execution wrapper.
///
/// Entries are created once at registration and never removed during normal
/// operation; the map itself is safe for concurrent reads while discovery
/// inserts new wrappers. Pending schedule overrides provision schedules for
/// jobs that arrive later via plugin discovery.
pub struct JobRegistry {
    timezone: Tz,
    history_capacity: usize,
    ids: Arc<RunIdGenerator>,
    jobs: RwLock<HashMap<String, Arc<ExecutionWrapper>>>,
    schedule_overrides: RwLock<HashMap<String, String>>,
    last_scan: Mutex<Option<DateTime<Utc>>>,
}

impl JobRegistry {
    /// Create a registry with the default history capacity.
    pub fn new(timezone: Tz) -> Self {
        Self::with_history_capacity(timezone, RunHistory::DEFAULT_CAPACITY)
    }

    /// Create a registry retaining `history_capacity` run records per job.
    pub fn with_history_capacity(timezone: Tz, history_capacity: usize) -> Self {
        Self {
            timezone,
            history_capacity,
            ids: Arc::new(RunIdGenerator::from_process()),
            jobs: RwLock::new(HashMap::new()),
            schedule_overrides: RwLock::new(HashMap::new()),
            last_scan: Mutex::new(None),
        }
    }

    fn parse_spec(spec: &str) -> Result<Schedule, ScheduleError> {
        Schedule::from_str(spec).map_err(|source| ScheduleError::InvalidSpec {
            spec: spec.to_string(),
            source,
        })
    }

    /// Register a job under its lower-cased name.
    ///
    /// The spec is parsed first; on failure nothing is mutated and the error
    /// propagates to the caller. A second registration under any case
    /// variant of an existing name is a no-op: first registration wins.
    pub fn register(&self, spec: &str, job: Arc<dyn Job>) -> Result<(), ScheduleError> {
        let schedule = Self::parse_spec(spec)?;
        let key = job.name().to_lowercase();
        let mut jobs = self.jobs.write();
        if jobs.contains_key(&key) {
            return Ok(());
        }
        let wrapper = Arc::new(ExecutionWrapper::new(
            job,
            schedule,
            self.timezone,
            self.history_capacity,
            Arc::clone(&self.ids),
        ));
        info!(job = %key, spec, "job registered");
        jobs.insert(key, wrapper);
        Ok(())
    }

    /// Record the schedule for a job expected to arrive via discovery.
    pub fn set_schedule_override(&self, name: &str, spec: impl Into<String>) {
        self.schedule_overrides
            .write()
            .insert(name.to_lowercase(), spec.into());
    }

    /// Record a batch of schedule overrides.
    pub fn set_schedule_overrides<I, K, V>(&self, batch: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut overrides = self.schedule_overrides.write();
        for (name, spec) in batch {
            overrides.insert(name.as_ref().to_lowercase(), spec.into());
        }
    }

    /// Merge newly discovered jobs into the registry.
    ///
    /// A job already registered is skipped. A job without a configured
    /// schedule override stays inert, and a per-job parse failure skips that
    /// job only; neither aborts the batch.
    pub fn discover_and_register(&self, discovered: Vec<Arc<dyn Job>>) {
        for job in discovered {
            let key = job.name().to_lowercase();
            if self.jobs.read().contains_key(&key) {
                continue;
            }
            let spec = self.schedule_overrides.read().get(&key).cloned();
            let Some(spec) = spec else {
                warn!(job = %key, "no schedule configured for discovered job, skipping");
                continue;
            };
            if let Err(err) = self.register(&spec, job) {
                warn!(job = %key, %err, "discovered job has an invalid schedule, skipping");
            }
        }
    }

    /// Watermark of the previous discovery scan.
    pub fn last_scan(&self) -> Option<DateTime<Utc>> {
        *self.last_scan.lock()
    }

    /// Record a completed discovery scan by its start time.
    pub fn record_scan(&self, started: DateTime<Utc>) {
        *self.last_scan.lock() = Some(started);
    }

    /// Look up a wrapper by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<Arc<ExecutionWrapper>> {
        self.jobs.read().get(&name.to_lowercase()).cloned()
    }

    /// All registered wrappers, in no particular order.
    pub fn wrappers(&self) -> Vec<Arc<ExecutionWrapper>> {
        self.jobs.read().values().cloned().collect()
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    /// Whether no job is registered.
    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    /// Point-in-time view of every registered job, ordered by name.
    ///
    /// This is the only read path used by the reporting endpoint; it holds
    /// the registry lock just long enough to clone the wrapper handles.
    pub fn snapshot(&self) -> Vec<JobReport> {
        let now = Utc::now();
        let mut reports: Vec<JobReport> = self
            .wrappers()
            .into_iter()
            .map(|wrapper| JobReport::capture(&wrapper, now))
            .collect();
        reports.sort_by(|a, b| a.name.cmp(&b.name));
        reports
    }
}

/// Reporting view of one registered job.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub name: String,
    pub description: String,
    /// Formatted start time of the most recent run, absent until first run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_execution: Option<String>,
    /// Formatted next fire time, absent when the schedule has no upcoming
    /// occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_execution: Option<String>,
    pub status: String,
    pub history: Vec<RunRecord>,
}

impl JobReport {
    fn capture(wrapper: &ExecutionWrapper, now: DateTime<Utc>) -> Self {
        Self {
            name: wrapper.name().to_string(),
            description: wrapper.description().to_string(),
            previous_execution: wrapper.previous_start().map(|at| wrapper.format_local(at)),
            next_execution: wrapper.next_fire(now).map(|at| wrapper.format_local(at)),
            status: wrapper.status().label().to_string(),
            history: wrapper.history(),
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
