//! The job capability contract.

use crate::error::JobError;

/// A recurring job as supplied by its source, either a direct registration
/// call or a discovered plugin module.
///
/// Implementations must be safe to share across threads: a job that allows
/// concurrent execution can have several runs in flight at once.
pub trait Job: Send + Sync {
    /// Job name. Used case-insensitively as the registry key; must be
    /// non-empty.
    fn name(&self) -> &str;

    /// Human-readable description for reporting.
    fn description(&self) -> &str;

    /// Whether overlapping executions of this job may run at the same time.
    ///
    /// When `false`, a fire that arrives while a run is still in flight is
    /// dropped, not queued.
    fn allow_concurrent(&self) -> bool {
        false
    }

    /// Execute the job once. This call may block for the run's entire
    /// duration; the engine executes it off the dispatch path.
    fn run(&self) -> Result<(), JobError>;
}
