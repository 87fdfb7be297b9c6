//! Elastic pool implementation

use crate::core::{BoxedJob, ClosureJob, Job, PackagedJob, PoolError, ResultHandle, Result};
use crate::pool::config::{PoolConfig, ShutdownPolicy};
use crate::pool::state::Shared;
use crate::pool::stats::PoolStatsSnapshot;
use crate::pool::worker::{is_worker_of, join_worker, Worker};
use std::sync::Arc;
use std::thread;

/// A worker pool that grows on demand and shrinks when idle
///
/// Workers are created lazily: a submission that finds no idle worker spawns
/// one, up to `max_workers`. A worker that stays idle longer than the idle
/// timeout retires on its own. All queue and counter bookkeeping happens
/// under a single lock; jobs run with the lock released.
///
/// # Shutdown
///
/// [`shutdown`](Self::shutdown) (also run on drop) stops accepting work, lets
/// running jobs finish and joins every worker. Jobs still queued are handled
/// according to the configured [`ShutdownPolicy`]: with the default `Drain`
/// they all run, with `Abandon` their handles resolve to
/// [`PoolError::Abandoned`]. Drain handles yourself before shutdown if you
/// need a different guarantee.
///
/// # Example
///
/// ```rust
/// use elastic_thread_pool::prelude::*;
///
/// # fn main() -> Result<()> {
/// let pool = ElasticPool::with_max_workers(4)?;
///
/// let handles: Vec<_> = (0..8u64)
///     .map(|i| pool.submit(move || i * i))
///     .collect::<Result<_>>()?;
///
/// let squares: Vec<u64> = handles
///     .into_iter()
///     .map(ResultHandle::wait)
///     .collect::<Result<_>>()?;
/// assert_eq!(squares[3], 9);
/// assert!(pool.current_worker_count() <= 4);
///
/// pool.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct ElasticPool {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ElasticPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticPool")
            .field("config", &self.shared.config)
            .field("state", &*self.shared.state.lock())
            .finish()
    }
}

impl ElasticPool {
    /// Create a pool capped at the number of CPUs
    pub fn new() -> Result<Self> {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool with the given worker cap (0 = number of CPUs)
    pub fn with_max_workers(max_workers: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(max_workers))
    }

    /// Create a pool with custom configuration
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared::new(config)),
        })
    }

    /// Submit a closure and get a handle to its result
    ///
    /// The closure runs on a pool worker; its return value, or the panic it
    /// raised, is delivered through the returned [`ResultHandle`].
    ///
    /// # Errors
    ///
    /// - `PoolError::ShuttingDown` - shutdown has begun. Submitting after
    ///   shutdown is a lifecycle bug in the caller; the job is not queued.
    /// - `PoolError::SpawnError` - the pool needed a new worker and could not
    ///   create one. The job stays queued and runs once a worker frees up, or
    ///   is abandoned at shutdown. Its handle is dropped with the error, so
    ///   the result is unreachable; resubmitting may run the work twice.
    pub fn submit<F, T>(&self, f: F) -> Result<ResultHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (job, handle) = PackagedJob::new(f);
        self.dispatch(Box::new(job))?;
        Ok(handle)
    }

    /// Submit a closure without a result handle
    ///
    /// A panic in the closure is caught and logged; the worker survives.
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.dispatch(Box::new(ClosureJob::new(f)))
    }

    /// Submit a custom job
    pub fn submit_job<J: Job + 'static>(&self, job: J) -> Result<()> {
        self.dispatch(Box::new(job))
    }

    /// Queue a job and decide, under the lock, how it gets a worker
    fn dispatch(&self, job: BoxedJob) -> Result<()> {
        let mut state = self.shared.state.lock();
        if state.shutting_down {
            let pending = state.queue.len();
            drop(state);
            log::error!(
                "job submitted to '{}' pool after shutdown began",
                self.shared.config.thread_name_prefix
            );
            return Err(PoolError::shutting_down(pending));
        }

        state.queue.push_back(job);
        self.shared.stats.record_submission();

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_submission(state.queue.len(), state.live_workers);

        if state.idle_workers > 0 {
            self.shared.work_available.notify_one();
        } else if state.live_workers < self.shared.config.max_workers {
            if let Err(e) = Worker::spawn(&self.shared, &mut state) {
                drop(state);
                log::error!("pool growth failed, job left queued: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Get the number of live workers
    ///
    /// A momentary snapshot; it may change as soon as the call returns.
    pub fn current_worker_count(&self) -> usize {
        self.shared.state.lock().live_workers
    }

    /// Get the number of workers parked waiting for work
    pub fn idle_worker_count(&self) -> usize {
        self.shared.state.lock().idle_workers
    }

    /// Get the number of jobs waiting for a worker
    pub fn queued_jobs(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Get the worker cap
    pub fn max_workers(&self) -> usize {
        self.shared.config.max_workers
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Check whether shutdown has begun
    pub fn is_shutting_down(&self) -> bool {
        self.shared.state.lock().shutting_down
    }

    /// Get a snapshot of the pool statistics
    pub fn stats(&self) -> PoolStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Shut the pool down and wait for every worker to terminate
    ///
    /// 1. Stops accepting new jobs
    /// 2. Applies the shutdown policy to queued jobs
    /// 3. Wakes every parked worker
    /// 4. Joins every registered worker, including ones that retired on idle
    ///    timeout and were never reclaimed
    ///
    /// Calling it again, or concurrently, blocks until the call that began
    /// shutdown has joined every worker. A job may shut down the pool it runs
    /// on: called from a worker of this pool, a later call returns at once
    /// instead of waiting for a teardown that is joining that worker.
    ///
    /// # Errors
    ///
    /// - `PoolError::JoinError` - a worker thread could not be joined. The
    ///   remaining workers are still joined before the first error is returned.
    pub fn shutdown(&self) -> Result<()> {
        let (workers, abandoned) = {
            let mut state = self.shared.state.lock();
            if state.shutting_down {
                if !is_worker_of(&self.shared) {
                    while !state.shutdown_complete {
                        self.shared.teardown_complete.wait(&mut state);
                    }
                }
                return Ok(());
            }
            state.shutting_down = true;

            let abandoned: Vec<BoxedJob> = match self.shared.config.shutdown_policy {
                ShutdownPolicy::Drain => Vec::new(),
                ShutdownPolicy::Abandon => state.queue.drain(..).collect(),
            };
            (state.take_registry(), abandoned)
        };
        self.shared.work_available.notify_all();

        let mut abandoned_count = self.abandon(abandoned);

        let current = thread::current().id();
        let mut joined = 0;
        let mut first_error = None;
        for (id, handle) in workers {
            if handle.thread().id() == current {
                // The last owner of the pool was dropped inside one of its jobs
                log::warn!("worker {} tore down its own pool; detaching it", id);
                self.shared.stats.record_detach();
                continue;
            }
            match join_worker(id, handle, &self.shared.stats) {
                Ok(()) => joined += 1,
                Err(e) => {
                    log::error!("{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        // Anything still queued had no worker left to run it
        let leftover: Vec<BoxedJob> = self.shared.state.lock().queue.drain(..).collect();
        abandoned_count += self.abandon(leftover);

        self.shared.state.lock().shutdown_complete = true;
        self.shared.teardown_complete.notify_all();

        log::debug!(
            "pool '{}' shut down: {} workers joined, {} jobs abandoned",
            self.shared.config.thread_name_prefix,
            joined,
            abandoned_count
        );
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_shutdown(joined, abandoned_count);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Drop jobs that will never run; packaged jobs resolve their handles
    /// to `PoolError::Abandoned` as they are dropped
    fn abandon(&self, jobs: Vec<BoxedJob>) -> usize {
        let count = jobs.len();
        if count > 0 {
            self.shared.stats.record_abandoned(count);
        }
        drop(jobs);
        count
    }
}

impl Drop for ElasticPool {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!(
                "Failed to shut down pool '{}' during drop: {}",
                self.shared.config.thread_name_prefix,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn wait_for<F: Fn() -> bool>(condition: F) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_pool_creation() {
        let pool = ElasticPool::new().expect("Failed to create pool");
        assert_eq!(pool.max_workers(), num_cpus::get());
        assert_eq!(pool.current_worker_count(), 0);
        assert!(!pool.is_shutting_down());

        pool.shutdown().expect("Failed to shutdown pool");
        assert!(pool.is_shutting_down());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PoolConfig::new(2).with_idle_timeout(Duration::ZERO);
        let result = ElasticPool::with_config(config);
        assert!(matches!(result, Err(PoolError::InvalidConfig { .. })));
    }

    #[test]
    fn test_first_submit_spawns_one_worker() {
        let pool = ElasticPool::with_max_workers(4).expect("Failed to create pool");
        let handle = pool.submit(|| 5).expect("Failed to submit job");

        assert_eq!(pool.current_worker_count(), 1);
        assert_eq!(handle.wait().expect("Job should complete"), 5);
        assert_eq!(pool.stats().workers_spawned, 1);

        pool.shutdown().expect("Failed to shutdown pool");
    }

    #[test]
    fn test_execute_runs_closure() {
        let pool = ElasticPool::with_max_workers(2).expect("Failed to create pool");
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter_clone = Arc::clone(&counter);
            pool.execute(move || {
                counter_clone.fetch_add(1, Ordering::Relaxed);
            })
            .expect("Failed to submit job");
        }

        pool.shutdown().expect("Failed to shutdown pool");
        assert_eq!(counter.load(Ordering::Relaxed), 10);
        assert_eq!(pool.stats().jobs_completed, 10);
    }

    #[test]
    fn test_submit_after_shutdown() {
        let pool = ElasticPool::with_max_workers(2).expect("Failed to create pool");
        pool.shutdown().expect("Failed to shutdown pool");

        let result = pool.submit(|| ());
        assert!(matches!(result, Err(PoolError::ShuttingDown { .. })));
        let result = pool.execute(|| ());
        assert!(matches!(result, Err(PoolError::ShuttingDown { .. })));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let pool = ElasticPool::with_max_workers(2).expect("Failed to create pool");
        pool.submit(|| ()).expect("Failed to submit job");

        pool.shutdown().expect("First shutdown");
        pool.shutdown().expect("Second shutdown");
        assert_eq!(pool.stats().workers_joined, 1);
    }

    #[test]
    fn test_running_job_finishes_before_shutdown_returns() {
        let pool = ElasticPool::with_max_workers(1).expect("Failed to create pool");
        let (started_tx, started_rx) = mpsc::channel();

        let handle = pool
            .submit(move || {
                started_tx.send(()).expect("test receiver alive");
                thread::sleep(Duration::from_millis(50));
                "finished"
            })
            .expect("Failed to submit job");

        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("Job should start within 5 seconds");
        pool.shutdown().expect("Failed to shutdown pool");

        let mut handle = handle;
        let outcome = handle.try_wait().expect("result published before shutdown returned");
        assert_eq!(outcome.expect("value"), "finished");
    }

    #[test]
    fn test_idle_worker_is_reused() {
        let pool = ElasticPool::with_max_workers(4).expect("Failed to create pool");
        pool.submit(|| ()).expect("submit").wait().expect("first job");
        wait_for(|| pool.idle_worker_count() == 1);

        for _ in 0..5 {
            pool.submit(|| ()).expect("submit").wait().expect("job");
            wait_for(|| pool.idle_worker_count() == 1);
        }

        assert_eq!(pool.current_worker_count(), 1);
        assert_eq!(pool.stats().workers_spawned, 1);
        pool.shutdown().expect("Failed to shutdown pool");
    }

    #[test]
    fn test_custom_job() {
        struct Tally(Arc<AtomicUsize>);

        impl Job for Tally {
            fn execute(self: Box<Self>) -> crate::core::JobOutcome {
                self.0.fetch_add(1, Ordering::SeqCst);
                crate::core::JobOutcome::Completed
            }

            fn job_type(&self) -> &str {
                "Tally"
            }
        }

        let pool = ElasticPool::with_max_workers(2).expect("Failed to create pool");
        let count = Arc::new(AtomicUsize::new(0));
        pool.submit_job(Tally(Arc::clone(&count)))
            .expect("Failed to submit job");

        pool.shutdown().expect("Failed to shutdown pool");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pool_dropped_inside_its_own_job() {
        let pool = Arc::new(ElasticPool::with_max_workers(1).expect("Failed to create pool"));
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let inner = Arc::clone(&pool);
        let handle = pool
            .submit(move || {
                release_rx.recv().expect("test sender alive");
                // `inner` is now the last owner; dropping it tears the pool down
                drop(inner);
                7
            })
            .expect("Failed to submit job");

        drop(pool);
        release_tx.send(()).expect("job waiting");
        assert_eq!(handle.wait().expect("Job should complete"), 7);
    }

    #[test]
    fn test_debug_output() {
        let pool = ElasticPool::with_max_workers(2).expect("Failed to create pool");
        let debug = format!("{:?}", pool);
        assert!(debug.contains("ElasticPool"));
        assert!(debug.contains("live_workers"));
    }
}
