//! Tests for the job registry.

use super::*;
use crate::error::JobError;

struct NamedJob {
    name: &'static str,
    description: &'static str,
}

impl NamedJob {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            description: "a named job",
        })
    }

    fn described(name: &'static str, description: &'static str) -> Arc<Self> {
        Arc::new(Self { name, description })
    }
}

impl Job for NamedJob {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn run(&self) -> Result<(), JobError> {
        Ok(())
    }
}

fn registry() -> JobRegistry {
    JobRegistry::new(chrono_tz::UTC)
}

#[test]
fn test_register_and_lookup_is_case_insensitive() {
    let registry = registry();
    registry
        .register("0 0 * * * *", NamedJob::new("TestJob"))
        .unwrap();

    assert!(registry.get("testjob").is_some());
    assert!(registry.get("TESTJOB").is_some());
    assert!(registry.get("TestJob").is_some());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_duplicate_registration_is_a_noop() {
    let registry = registry();
    registry
        .register(
            "0 0 * * * *",
            NamedJob::described("TestJob", "the original"),
        )
        .unwrap();
    // Any case variant of an existing name: first registration wins.
    registry
        .register(
            "0 30 * * * *",
            NamedJob::described("testjob", "the impostor"),
        )
        .unwrap();

    assert_eq!(registry.len(), 1);
    let wrapper = registry.get("testjob").unwrap();
    assert_eq!(wrapper.description(), "the original");
}

#[test]
fn test_invalid_spec_rejected_without_mutation() {
    let registry = registry();
    let err = registry
        .register("not-a-cron-expr", NamedJob::new("broken"))
        .unwrap_err();

    assert!(matches!(err, ScheduleError::InvalidSpec { .. }));
    assert!(registry.is_empty());
    assert!(registry.snapshot().is_empty());
}

#[test]
fn test_discovery_requires_schedule_override() {
    let registry = registry();
    registry.discover_and_register(vec![NamedJob::new("orphan") as Arc<dyn Job>]);

    // No configured schedule: the discovered job stays inert.
    assert!(registry.is_empty());
    assert!(registry.snapshot().is_empty());
}

#[test]
fn test_discovery_uses_override_and_skips_bad_specs() {
    let registry = registry();
    registry.set_schedule_override("Good", "0 0 * * * *");
    registry.set_schedule_override("Bad", "not-a-cron-expr");

    registry.discover_and_register(vec![
        NamedJob::new("Good") as Arc<dyn Job>,
        NamedJob::new("Bad") as Arc<dyn Job>,
        NamedJob::new("Unconfigured") as Arc<dyn Job>,
    ]);

    // One per-job parse failure never aborts the batch.
    assert_eq!(registry.len(), 1);
    assert!(registry.get("good").is_some());
    assert!(registry.get("bad").is_none());
}

#[test]
fn test_discovery_is_idempotent() {
    let registry = registry();
    registry.set_schedule_overrides([("repeat", "0 0 * * * *")]);

    registry.discover_and_register(vec![NamedJob::new("Repeat") as Arc<dyn Job>]);
    let wrapper = registry.get("repeat").unwrap();

    registry.discover_and_register(vec![NamedJob::new("Repeat") as Arc<dyn Job>]);
    assert_eq!(registry.len(), 1);
    // Same wrapper instance: rediscovery produced no side effects.
    assert!(Arc::ptr_eq(&wrapper, &registry.get("repeat").unwrap()));
}

#[test]
fn test_batch_overrides() {
    let registry = registry();
    registry.set_schedule_overrides([
        ("First", "0 0 * * * *"),
        ("Second", "0 30 * * * *"),
    ]);

    registry.discover_and_register(vec![
        NamedJob::new("first") as Arc<dyn Job>,
        NamedJob::new("SECOND") as Arc<dyn Job>,
    ]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_scan_watermark() {
    let registry = registry();
    assert!(registry.last_scan().is_none());

    let started = Utc::now();
    registry.record_scan(started);
    assert_eq!(registry.last_scan(), Some(started));
}

#[test]
fn test_snapshot_is_ordered_and_complete() {
    let registry = registry();
    registry
        .register("0 0 * * * *", NamedJob::described("zeta", "last"))
        .unwrap();
    registry
        .register("0 0 * * * *", NamedJob::described("alpha", "first"))
        .unwrap();

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].name, "alpha");
    assert_eq!(snapshot[1].name, "zeta");

    let report = &snapshot[0];
    assert_eq!(report.description, "first");
    assert_eq!(report.status, "Ready(First)");
    assert!(report.previous_execution.is_none());
    assert!(report.next_execution.is_some());
    assert!(report.history.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_snapshot_reflects_completed_run() {
    let registry = registry();
    registry
        .register("0 0 * * * *", NamedJob::new("worker"))
        .unwrap();

    let wrapper = registry.get("worker").unwrap();
    wrapper.run().await;

    let snapshot = registry.snapshot();
    let report = &snapshot[0];
    assert_eq!(report.status, "Sleeping");
    assert!(report.previous_execution.is_some());
    assert_eq!(report.history.len(), 1);
}
