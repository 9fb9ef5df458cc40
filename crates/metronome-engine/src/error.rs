//! Error types for the scheduling engine.

use thiserror::Error;

/// Errors surfaced while configuring schedules.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The schedule specification string failed to parse.
    #[error("invalid schedule spec {spec:?}: {source}")]
    InvalidSpec {
        spec: String,
        #[source]
        source: cron::error::Error,
    },

    /// The configured time zone name could not be resolved.
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),
}

/// Failure reported by a job's run action.
///
/// Captured into the run's history record; it never affects future
/// scheduling and is never retried.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct JobError(String);

impl JobError {
    /// Create a failure with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<String> for JobError {
    fn from(reason: String) -> Self {
        Self(reason)
    }
}

impl From<&str> for JobError {
    fn from(reason: &str) -> Self {
        Self(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_display() {
        let err = JobError::new("timeout");
        assert_eq!(err.to_string(), "timeout");
    }

    #[test]
    fn test_invalid_spec_display() {
        let source = "not-a-cron-expr".parse::<cron::Schedule>().unwrap_err();
        let err = ScheduleError::InvalidSpec {
            spec: "not-a-cron-expr".to_string(),
            source,
        };
        assert!(err.to_string().contains("not-a-cron-expr"));
    }

    #[test]
    fn test_unknown_time_zone_display() {
        let err = ScheduleError::UnknownTimeZone("Mars/Olympus".to_string());
        assert_eq!(err.to_string(), "unknown time zone: Mars/Olympus");
    }
}
