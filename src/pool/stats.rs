//! Pool-wide statistics
//!
//! Counters are plain atomics updated outside the pool lock, so they are
//! eventually consistent with the lock-protected accounting in the pool state.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Statistics for an elastic pool
#[derive(Debug, Default)]
pub struct PoolStats {
    jobs_submitted: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_panicked: AtomicU64,
    jobs_abandoned: AtomicU64,
    workers_spawned: AtomicU64,
    workers_retired: AtomicU64,
    workers_joined: AtomicU64,
    workers_detached: AtomicU64,
    peak_workers: AtomicUsize,
    total_processing_time_us: AtomicU64,
}

impl PoolStats {
    /// Create new pool statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted submission
    pub fn record_submission(&self) {
        self.jobs_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a job that ran to completion
    pub fn record_completion(&self, elapsed: Duration) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
        self.add_processing_time(elapsed);
    }

    /// Record a job that panicked
    pub fn record_panic(&self, elapsed: Duration) {
        self.jobs_panicked.fetch_add(1, Ordering::Relaxed);
        self.add_processing_time(elapsed);
    }

    /// Record jobs dropped without running
    pub fn record_abandoned(&self, count: usize) {
        self.jobs_abandoned
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a new worker; `live` is the live count including it
    pub fn record_spawn(&self, live: usize) {
        self.workers_spawned.fetch_add(1, Ordering::Relaxed);
        self.peak_workers.fetch_max(live, Ordering::Relaxed);
    }

    /// Record a worker retiring on idle timeout
    pub fn record_retirement(&self) {
        self.workers_retired.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker thread joined
    pub fn record_join(&self) {
        self.workers_joined.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker thread released without a join
    pub fn record_detach(&self) {
        self.workers_detached.fetch_add(1, Ordering::Relaxed);
    }

    fn add_processing_time(&self, elapsed: Duration) {
        self.total_processing_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            jobs_submitted: self.jobs_submitted.load(Ordering::Relaxed),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            jobs_panicked: self.jobs_panicked.load(Ordering::Relaxed),
            jobs_abandoned: self.jobs_abandoned.load(Ordering::Relaxed),
            workers_spawned: self.workers_spawned.load(Ordering::Relaxed),
            workers_retired: self.workers_retired.load(Ordering::Relaxed),
            workers_joined: self.workers_joined.load(Ordering::Relaxed),
            workers_detached: self.workers_detached.load(Ordering::Relaxed),
            peak_workers: self.peak_workers.load(Ordering::Relaxed),
            total_processing_time_us: self.total_processing_time_us.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`PoolStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatsSnapshot {
    /// Jobs accepted by `submit`, `execute` or `submit_job`
    pub jobs_submitted: u64,
    /// Jobs that ran to completion
    pub jobs_completed: u64,
    /// Jobs that panicked
    pub jobs_panicked: u64,
    /// Jobs dropped without running
    pub jobs_abandoned: u64,
    /// Worker threads created
    pub workers_spawned: u64,
    /// Workers that retired after the idle timeout
    pub workers_retired: u64,
    /// Worker threads joined, by a retiring worker or by teardown
    pub workers_joined: u64,
    /// Worker threads released without a join (teardown ran on that worker)
    pub workers_detached: u64,
    /// Highest number of live workers observed
    pub peak_workers: usize,
    /// Total time spent executing jobs (microseconds)
    pub total_processing_time_us: u64,
}

impl PoolStatsSnapshot {
    /// Jobs that ran, successfully or not
    pub fn jobs_processed(&self) -> u64 {
        self.jobs_completed + self.jobs_panicked
    }

    /// Get average processing time per job in microseconds
    pub fn average_processing_time_us(&self) -> f64 {
        let count = self.jobs_processed();
        if count > 0 {
            self.total_processing_time_us as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Serialize the snapshot as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
