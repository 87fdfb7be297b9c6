//! Lock-protected pool state
//!
//! Everything a submitter or a worker needs to coordinate on lives in
//! [`PoolState`], and the only way to reach it is through the mutex in
//! [`Shared`]. Job execution never happens while the lock is held.

use crate::core::BoxedJob;
use crate::pool::config::PoolConfig;
use crate::pool::stats::PoolStats;
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::thread::JoinHandle;

/// Identity of a worker within one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub(crate) usize);

impl WorkerId {
    /// Numeric value of the id
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Queue and accounting guarded by the pool lock
///
/// Invariant: `idle_workers <= live_workers <= max_workers`.
pub(crate) struct PoolState {
    pub(crate) queue: VecDeque<BoxedJob>,
    pub(crate) live_workers: usize,
    pub(crate) idle_workers: usize,
    pub(crate) shutting_down: bool,
    /// Set once the call that began shutdown has joined every worker
    pub(crate) shutdown_complete: bool,
    /// Workers that retired on idle timeout and still need a join
    pub(crate) retired: VecDeque<WorkerId>,
    pub(crate) registry: HashMap<WorkerId, JoinHandle<()>>,
    next_worker_id: usize,
}

impl PoolState {
    pub(crate) fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            live_workers: 0,
            idle_workers: 0,
            shutting_down: false,
            shutdown_complete: false,
            retired: VecDeque::new(),
            registry: HashMap::new(),
            next_worker_id: 0,
        }
    }

    pub(crate) fn allocate_worker_id(&mut self) -> WorkerId {
        let id = WorkerId(self.next_worker_id);
        self.next_worker_id += 1;
        id
    }

    /// Remove every retired worker from the registry, handing ownership of
    /// their threads to the caller
    ///
    /// Ids whose handle is already gone (teardown took the registry first)
    /// are skipped.
    pub(crate) fn take_retired(&mut self) -> Vec<(WorkerId, JoinHandle<()>)> {
        let mut reclaimed = Vec::with_capacity(self.retired.len());
        while let Some(id) = self.retired.pop_front() {
            if let Some(handle) = self.registry.remove(&id) {
                reclaimed.push((id, handle));
            }
        }
        reclaimed
    }

    /// Remove every registered worker, regardless of how it exited
    pub(crate) fn take_registry(&mut self) -> Vec<(WorkerId, JoinHandle<()>)> {
        self.retired.clear();
        let mut workers: Vec<_> = self.registry.drain().collect();
        workers.sort_by_key(|(id, _)| *id);
        workers
    }
}

impl fmt::Debug for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolState")
            .field("queued", &self.queue.len())
            .field("live_workers", &self.live_workers)
            .field("idle_workers", &self.idle_workers)
            .field("shutting_down", &self.shutting_down)
            .field("shutdown_complete", &self.shutdown_complete)
            .field("retired", &self.retired)
            .field("registered", &self.registry.len())
            .finish()
    }
}

/// State shared between the pool handle and its worker threads
pub(crate) struct Shared {
    pub(crate) state: Mutex<PoolState>,
    /// Signalled when work is queued or shutdown begins
    pub(crate) work_available: Condvar,
    /// Signalled when `shutdown_complete` is set
    pub(crate) teardown_complete: Condvar,
    pub(crate) config: PoolConfig,
    pub(crate) stats: PoolStats,
}

impl Shared {
    pub(crate) fn new(config: PoolConfig) -> Self {
        Self {
            state: Mutex::new(PoolState::new()),
            work_available: Condvar::new(),
            teardown_complete: Condvar::new(),
            config,
            stats: PoolStats::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_worker_ids_are_sequential() {
        let mut state = PoolState::new();
        assert_eq!(state.allocate_worker_id(), WorkerId(0));
        assert_eq!(state.allocate_worker_id(), WorkerId(1));
        assert_eq!(WorkerId(7).to_string(), "7");
    }

    #[test]
    fn test_take_retired_skips_unregistered_ids() {
        let mut state = PoolState::new();
        let a = state.allocate_worker_id();
        let b = state.allocate_worker_id();
        state.registry.insert(a, thread::spawn(|| {}));
        state.retired.push_back(a);
        state.retired.push_back(b);

        let reclaimed = state.take_retired();
        assert_eq!(reclaimed.len(), 1);
        assert_eq!(reclaimed[0].0, a);
        assert!(state.retired.is_empty());
        assert!(state.registry.is_empty());

        for (_, handle) in reclaimed {
            handle.join().expect("join");
        }
    }

    #[test]
    fn test_take_registry_clears_everything() {
        let mut state = PoolState::new();
        for _ in 0..3 {
            let id = state.allocate_worker_id();
            state.registry.insert(id, thread::spawn(|| {}));
        }
        state.retired.push_back(WorkerId(1));

        let workers = state.take_registry();
        let ids: Vec<_> = workers.iter().map(|(id, _)| id.get()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(state.retired.is_empty());
        assert!(state.registry.is_empty());

        for (_, handle) in workers {
            handle.join().expect("join");
        }
    }
}
