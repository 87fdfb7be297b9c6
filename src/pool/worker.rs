//! Worker thread implementation
//!
//! A worker cycles between Idle (parked on the pool condition variable) and
//! Running (executing one job with the lock released). It retires either
//! because shutdown was signalled and the queue is empty, or because it sat
//! idle past the idle deadline. A worker retiring on timeout cannot join
//! itself, so it leaves its id in the retired queue for the next retiring
//! worker, or teardown, to reclaim.

use crate::core::job::panic_message;
use crate::core::{BoxedJob, JobOutcome, PoolError, Result};
use crate::pool::state::{PoolState, Shared, WorkerId};
use crate::pool::stats::PoolStats;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

thread_local! {
    /// Address of the shared state of the pool this thread works for
    static CURRENT_POOL: Cell<usize> = Cell::new(0);
}

/// Returns true when called on one of the worker threads of `shared`
pub(crate) fn is_worker_of(shared: &Arc<Shared>) -> bool {
    CURRENT_POOL.with(|pool| pool.get() == Arc::as_ptr(shared) as usize)
}

/// A worker thread's view of the pool
pub(crate) struct Worker {
    id: WorkerId,
    shared: Arc<Shared>,
}

impl Worker {
    /// Spawn a worker thread, register it and count it as live
    ///
    /// Must be called with the pool lock held; `state` is the guarded state.
    /// The new thread blocks on the lock until the caller releases it, so it
    /// is always registered before it can retire.
    pub(crate) fn spawn(shared: &Arc<Shared>, state: &mut PoolState) -> Result<WorkerId> {
        let id = state.allocate_worker_id();

        let mut builder =
            thread::Builder::new().name(format!("{}-{}", shared.config.thread_name_prefix, id));
        if let Some(size) = shared.config.stack_size {
            builder = builder.stack_size(size);
        }

        let worker = Worker {
            id,
            shared: Arc::clone(shared),
        };
        let handle = builder
            .spawn(move || worker.run())
            .map_err(|e| PoolError::spawn_with_source(id.get(), e.to_string(), e))?;

        state.registry.insert(id, handle);
        state.live_workers += 1;
        shared.stats.record_spawn(state.live_workers);

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_worker_spawned(id.get(), state.live_workers);

        Ok(id)
    }

    /// Main worker loop
    fn run(self) {
        #[cfg(feature = "tracing")]
        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", id = self.id.get());
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        CURRENT_POOL.with(|pool| pool.set(Arc::as_ptr(&self.shared) as usize));
        log::debug!("worker {} started", self.id);

        while let Some(job) = self.next_job() {
            self.execute_job(job);
        }
    }

    /// Park until a job is available
    ///
    /// Returns `None` once the worker has retired; by then it has already
    /// removed itself from the live count.
    fn next_job(&self) -> Option<BoxedJob> {
        let mut state = self.shared.state.lock();
        state.idle_workers += 1;

        let deadline = Instant::now() + self.shared.config.idle_timeout;
        while !state.shutting_down && state.queue.is_empty() {
            if self
                .shared
                .work_available
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                break;
            }
        }
        state.idle_workers -= 1;

        if let Some(job) = state.queue.pop_front() {
            return Some(job);
        }

        state.live_workers -= 1;

        if state.shutting_down {
            drop(state);
            log::debug!("worker {} retiring on shutdown", self.id);
            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_worker_retired(self.id.get(), "shutdown");
            return None;
        }

        // Idle deadline passed: reap earlier retirees, then queue ourselves
        let reclaimed = state.take_retired();
        state.retired.push_back(self.id);
        drop(state);

        self.shared.stats.record_retirement();
        log::debug!(
            "worker {} retiring after {:?} idle, reclaiming {} retired workers",
            self.id,
            self.shared.config.idle_timeout,
            reclaimed.len()
        );
        #[cfg(feature = "tracing")]
        {
            crate::tracing::metrics::record_worker_retired(self.id.get(), "idle_timeout");
            crate::tracing::metrics::record_workers_reclaimed(reclaimed.len());
        }

        for (id, handle) in reclaimed {
            if let Err(e) = join_worker(id, handle, &self.shared.stats) {
                log::error!("worker {}: {}", self.id, e);
            }
        }
        None
    }

    /// Execute a single job with panic protection
    fn execute_job(&self, job: BoxedJob) {
        #[cfg(feature = "tracing")]
        let job_span = tracing::span!(
            tracing::Level::DEBUG,
            "job_execution",
            job_type = job.job_type()
        );
        #[cfg(feature = "tracing")]
        let _job_guard = job_span.enter();

        let start = Instant::now();

        // Packaged jobs capture their own panics; this covers custom jobs
        let outcome = catch_unwind(AssertUnwindSafe(move || job.execute()))
            .unwrap_or_else(|payload| JobOutcome::Panicked(panic_message(payload.as_ref())));

        let elapsed = start.elapsed();

        match outcome {
            JobOutcome::Completed => {
                self.shared.stats.record_completion(elapsed);
                #[cfg(feature = "tracing")]
                crate::tracing::metrics::record_completion(elapsed);
            }
            JobOutcome::Panicked(message) => {
                log::warn!("worker {}: job panicked: {}", self.id, message);
                self.shared.stats.record_panic(elapsed);
                #[cfg(feature = "tracing")]
                crate::tracing::metrics::record_panic(elapsed);
            }
        }
    }
}

/// Join a worker thread that has retired or been told to retire
pub(crate) fn join_worker(id: WorkerId, handle: JoinHandle<()>, stats: &PoolStats) -> Result<()> {
    handle
        .join()
        .map_err(|payload| PoolError::join(id.get(), panic_message(payload.as_ref())))?;
    stats.record_join();
    Ok(())
}
