//! Scheduler configuration surface.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::history::RunHistory;

/// Configuration consumed at scheduler construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// IANA time zone applied to next-fire computations and formatted
    /// timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Directory scanned for job plugin modules. Discovery is skipped when
    /// unset.
    #[serde(default)]
    pub plugin_dir: Option<PathBuf>,

    /// Run records retained per job.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Schedule spec per job name. Names are matched case-insensitively
    /// against discovered jobs.
    #[serde(default)]
    pub schedules: HashMap<String, String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_history_capacity() -> usize {
    RunHistory::DEFAULT_CAPACITY
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            plugin_dir: None,
            history_capacity: default_history_capacity(),
            schedules: HashMap::new(),
        }
    }
}

impl SchedulerConfig {
    /// Set the reference time zone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Set the plugin directory.
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = Some(dir.into());
        self
    }

    /// Set the per-job history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Add one schedule override.
    pub fn with_schedule(mut self, name: impl Into<String>, spec: impl Into<String>) -> Self {
        self.schedules.insert(name.into(), spec.into());
        self
    }

    /// Resolve the configured time zone.
    ///
    /// An unresolvable zone is fatal at startup: without it the engine has
    /// no consistent reference clock.
    pub fn resolve_timezone(&self) -> Result<Tz, ScheduleError> {
        self.timezone
            .parse()
            .map_err(|_| ScheduleError::UnknownTimeZone(self.timezone.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.timezone, "UTC");
        assert!(config.plugin_dir.is_none());
        assert_eq!(config.history_capacity, 10);
        assert!(config.schedules.is_empty());
    }

    #[test]
    fn test_builder() {
        let config = SchedulerConfig::default()
            .with_timezone("Asia/Bangkok")
            .with_plugin_dir("/var/lib/metronome/plugins")
            .with_history_capacity(25)
            .with_schedule("nightly-report", "0 0 2 * * *");

        assert_eq!(config.timezone, "Asia/Bangkok");
        assert!(config.plugin_dir.is_some());
        assert_eq!(config.history_capacity, 25);
        assert_eq!(
            config.schedules.get("nightly-report").map(String::as_str),
            Some("0 0 2 * * *")
        );
    }

    #[test]
    fn test_timezone_resolution() {
        let config = SchedulerConfig::default().with_timezone("Asia/Bangkok");
        assert!(config.resolve_timezone().is_ok());

        let config = SchedulerConfig::default().with_timezone("Mars/Olympus");
        assert!(matches!(
            config.resolve_timezone(),
            Err(ScheduleError::UnknownTimeZone(_))
        ));
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: SchedulerConfig = toml::from_str(
            r#"
            timezone = "Europe/Berlin"

            [schedules]
            cleanup = "0 15 3 * * *"
            "#,
        )
        .unwrap();

        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.schedules.len(), 1);
    }
}
