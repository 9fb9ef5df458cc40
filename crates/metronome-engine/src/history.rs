//! Bounded per-job run history.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Outcome of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// The run action returned without error.
    Success,
    /// The run action reported a failure.
    Failed,
}

/// Immutable record of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// Unique instance id for log/history correlation.
    pub instance_id: u64,
    /// When the run started.
    pub start_time: DateTime<Utc>,
    /// When the run action returned.
    pub completion_time: DateTime<Utc>,
    /// Whole seconds between start and completion.
    pub elapsed_secs: i64,
    /// Success or failure.
    pub outcome: RunOutcome,
    /// Failure reason. Present only when the outcome is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fixed-capacity ring of recent [`RunRecord`]s.
///
/// Shared between the producing execution and any concurrent reader. Once
/// full, the oldest record by insertion order is overwritten first; length
/// never exceeds the capacity fixed at construction.
#[derive(Debug)]
pub struct RunHistory {
    inner: Mutex<Ring>,
}

#[derive(Debug)]
struct Ring {
    records: Vec<RunRecord>,
    cursor: usize,
    capacity: usize,
}

impl RunHistory {
    /// Records retained per job unless configured otherwise.
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Create an empty history retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Ring {
                records: Vec::with_capacity(capacity),
                cursor: 0,
                capacity,
            }),
        }
    }

    /// Append a record, overwriting the oldest once the ring is full. O(1).
    pub fn add(&self, record: RunRecord) {
        let mut ring = self.inner.lock();
        if ring.records.len() < ring.capacity {
            ring.records.push(record);
            return;
        }
        let at = ring.cursor;
        ring.records[at] = record;
        ring.cursor = (at + 1) % ring.capacity;
    }

    /// Copy of the retained records, most recent start time first.
    ///
    /// The copy decouples readers from the writer and from ring-position
    /// semantics.
    pub fn snapshot(&self) -> Vec<RunRecord> {
        let mut records = self.inner.lock().records.clone();
        records.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        records
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Whether no run has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }
}

impl Default for RunHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
