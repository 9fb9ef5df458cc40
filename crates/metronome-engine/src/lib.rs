//! # Metronome Engine
//!
//! In-process recurring-job scheduling: a case-insensitive job registry, a
//! per-job execution state machine with an atomic concurrency guard, a
//! bounded run-history ring per job, and a dispatch loop that fires due jobs
//! without ever blocking inside one.
//!
//! ## Key Components
//!
//! - [`Job`]: the capability contract every job source satisfies
//! - [`JobRegistry`]: registration, schedule overrides, status snapshots
//! - [`ExecutionWrapper`]: one job's schedule, status, and history
//! - [`RunHistory`]: fixed-capacity ring of recent [`RunRecord`]s
//! - [`Dispatcher`] / [`Scheduler`]: the dispatch loop and its handle
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use metronome_engine::{Job, JobError, JobRegistry, Scheduler};
//!
//! struct Heartbeat;
//!
//! impl Job for Heartbeat {
//!     fn name(&self) -> &str {
//!         "heartbeat"
//!     }
//!     fn description(&self) -> &str {
//!         "logs a liveness line"
//!     }
//!     fn run(&self) -> Result<(), JobError> {
//!         tracing::info!("still alive");
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(JobRegistry::new(chrono_tz::UTC));
//!     registry
//!         .register("0 * * * * *", Arc::new(Heartbeat))
//!         .expect("valid schedule spec");
//!
//!     let scheduler = Scheduler::start(Arc::clone(&registry));
//!     tokio::signal::ctrl_c().await.ok();
//!     scheduler.stop().await;
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod job;
pub mod registry;
pub mod runid;
pub mod scheduler;
pub mod wrapper;

pub use config::SchedulerConfig;
pub use dispatch::Dispatcher;
pub use error::{JobError, ScheduleError};
pub use history::{RunHistory, RunOutcome, RunRecord};
pub use job::Job;
pub use registry::{JobRegistry, JobReport};
pub use runid::RunIdGenerator;
pub use scheduler::Scheduler;
pub use wrapper::{ExecutionWrapper, RunStatus};
