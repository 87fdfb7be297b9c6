//! Single-assignment result cells shared between a worker and a submitter
//!
//! Every submitted job gets a pair: the pool keeps the [`ResultSlot`] and
//! writes the outcome into it once the job has run, the caller keeps the
//! [`ResultHandle`] and reads the outcome when it needs it.
//!
//! # Example
//!
//! ```rust
//! use elastic_thread_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let pool = ElasticPool::with_max_workers(2)?;
//! let mut handle = pool.submit(|| 6 * 7)?;
//!
//! // Poll with a timeout, then block for the value
//! if let Some(result) = handle.wait_timeout(Duration::from_secs(5)) {
//!     assert_eq!(result?, 42);
//! }
//! # Ok(())
//! # }
//! ```

use crate::core::{PoolError, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Generates a unique job ID
pub(crate) fn next_job_id() -> u64 {
    NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed)
}

/// Creates a connected slot/handle pair for a new job
pub fn result_channel<T>() -> (ResultSlot<T>, ResultHandle<T>) {
    let job_id = next_job_id();
    let (sender, receiver) = crossbeam_channel::bounded(1);
    (
        ResultSlot {
            job_id,
            sender: Some(sender),
        },
        ResultHandle {
            job_id,
            receiver,
            consumed: false,
        },
    )
}

/// Write side of a job's result cell
///
/// `fulfill` consumes the slot, so it can be written at most once. A slot
/// dropped without being fulfilled writes [`PoolError::Abandoned`], so every
/// handle is eventually resolved.
pub struct ResultSlot<T> {
    job_id: u64,
    sender: Option<Sender<Result<T>>>,
}

impl<T> ResultSlot<T> {
    /// ID of the job this slot belongs to
    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    /// Publish the job's outcome
    pub fn fulfill(mut self, outcome: Result<T>) {
        if let Some(sender) = self.sender.take() {
            // The caller may have dropped its handle; nobody is left to tell.
            let _ = sender.send(outcome);
        }
    }
}

impl<T> Drop for ResultSlot<T> {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Err(PoolError::abandoned(self.job_id)));
        }
    }
}

impl<T> fmt::Debug for ResultSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSlot")
            .field("job_id", &self.job_id)
            .field("fulfilled", &self.sender.is_none())
            .finish()
    }
}

/// Read side of a job's result cell
///
/// The handle is the only path through which a job's return value, or the
/// panic it raised, reaches the caller.
pub struct ResultHandle<T> {
    job_id: u64,
    receiver: Receiver<Result<T>>,
    consumed: bool,
}

impl<T> ResultHandle<T> {
    /// Get the unique job ID
    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    /// Returns true once the outcome is available (or was already taken)
    pub fn is_finished(&self) -> bool {
        self.consumed || !self.receiver.is_empty()
    }

    /// Block until the job's outcome is available
    ///
    /// # Errors
    ///
    /// - `PoolError::JobPanicked` - the callable panicked
    /// - `PoolError::Abandoned` - the pool dropped the job without running it
    /// - `PoolError::ResultConsumed` - the outcome was already taken
    pub fn wait(mut self) -> Result<T> {
        if self.consumed {
            return Err(PoolError::result_consumed(self.job_id));
        }
        self.consumed = true;
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(PoolError::abandoned(self.job_id)))
    }

    /// Wait up to `timeout` for the job's outcome
    ///
    /// Returns `None` if the outcome is not ready yet; the handle stays
    /// usable and can be waited on again.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<T>> {
        if self.consumed {
            return Some(Err(PoolError::result_consumed(self.job_id)));
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => {
                self.consumed = true;
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.consumed = true;
                Some(Err(PoolError::abandoned(self.job_id)))
            }
        }
    }

    /// Take the outcome if it is ready, without blocking
    pub fn try_wait(&mut self) -> Option<Result<T>> {
        if self.consumed {
            return Some(Err(PoolError::result_consumed(self.job_id)));
        }
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.consumed = true;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.consumed = true;
                Some(Err(PoolError::abandoned(self.job_id)))
            }
        }
    }
}

impl<T> fmt::Debug for ResultHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandle")
            .field("job_id", &self.job_id)
            .field("finished", &self.is_finished())
            .finish()
    }
}
