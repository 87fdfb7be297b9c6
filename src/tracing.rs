//! Tracing integration for observability.
//!
//! With the `tracing` feature enabled, every worker runs inside a `worker`
//! span, every job inside a `job_execution` span, and jobs submitted through
//! [`ElasticPool::submit`] enter the span that was current at submission time.
//! The functions in [`metrics`] emit metric-style events that collectors such
//! as tracing-opentelemetry can turn into counters, gauges and histograms.
//!
//! # Example
//!
//! ```rust,ignore
//! use elastic_thread_pool::prelude::*;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("elastic_thread_pool=debug".parse().unwrap()))
//!     .init();
//!
//! let pool = ElasticPool::with_max_workers(4)?;
//! let span = tracing::info_span!("frame", index = 7);
//! let handle = span.in_scope(|| pool.submit(|| decode_frame()))?;
//! ```
//!
//! [`ElasticPool::submit`]: crate::ElasticPool::submit

/// Metrics recording functions for observability.
#[cfg(feature = "tracing")]
pub mod metrics {
    use std::time::Duration;

    /// Records a job submission.
    #[inline]
    pub fn record_submission(queue_depth: usize, live_workers: usize) {
        tracing::trace!(
            counter.jobs_submitted = 1,
            gauge.queue_depth = queue_depth as i64,
            gauge.live_workers = live_workers as i64,
            "job submitted"
        );
    }

    /// Records job completion with timing.
    #[inline]
    pub fn record_completion(duration: Duration) {
        tracing::trace!(
            counter.jobs_completed = 1,
            histogram.job_duration_ms = duration.as_millis() as u64,
            "job completed"
        );
    }

    /// Records a job panic event.
    #[inline]
    pub fn record_panic(duration: Duration) {
        tracing::trace!(
            counter.jobs_panicked = 1,
            histogram.job_duration_ms = duration.as_millis() as u64,
            "job panicked"
        );
    }

    /// Records a new worker thread.
    #[inline]
    pub fn record_worker_spawned(worker_id: usize, live_workers: usize) {
        tracing::debug!(
            counter.workers_spawned = 1,
            gauge.live_workers = live_workers as i64,
            worker_id = worker_id,
            "worker spawned"
        );
    }

    /// Records a worker leaving the pool.
    #[inline]
    pub fn record_worker_retired(worker_id: usize, reason: &str) {
        tracing::debug!(
            counter.workers_retired = 1,
            worker_id = worker_id,
            reason = reason,
            "worker retired"
        );
    }

    /// Records retired workers joined by a retiring worker.
    #[inline]
    pub fn record_workers_reclaimed(count: usize) {
        if count > 0 {
            tracing::trace!(counter.workers_reclaimed = count as u64, "workers reclaimed");
        }
    }

    /// Records pool shutdown.
    #[inline]
    pub fn record_pool_shutdown(workers_joined: usize, jobs_abandoned: usize) {
        tracing::info!(
            workers_joined = workers_joined,
            jobs_abandoned = jobs_abandoned,
            "elastic pool shutdown complete"
        );
    }
}
