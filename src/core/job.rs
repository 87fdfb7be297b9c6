//! Job trait and related types

use crate::core::error::PoolError;
use crate::core::handle::{result_channel, ResultHandle, ResultSlot};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// How a job finished, as seen by the worker that ran it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job ran to completion
    Completed,
    /// The job panicked; the panic was captured and reported to its owner
    Panicked(String),
}

/// A type-erased unit of work executed by the pool
///
/// Implementations run exactly once. A panic escaping `execute` is caught by
/// the worker and does not take the worker thread down.
pub trait Job: Send {
    /// Run the job, consuming it
    fn execute(self: Box<Self>) -> JobOutcome;

    /// Get the job's type name for debugging and statistics
    fn job_type(&self) -> &str {
        "Job"
    }
}

impl fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({})", self.job_type())
    }
}

/// A boxed job that can be sent across threads
pub type BoxedJob = Box<dyn Job>;

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// A closure packaged with the slot that receives its return value
///
/// Created by [`PackagedJob::new`], which also hands back the
/// [`ResultHandle`] the submitter keeps.
pub struct PackagedJob<F, T> {
    closure: F,
    slot: ResultSlot<T>,
    #[cfg(feature = "tracing")]
    span: tracing::Span,
}

impl<F, T> PackagedJob<F, T>
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    /// Package a closure and return it together with its result handle
    pub fn new(closure: F) -> (Self, ResultHandle<T>) {
        let (slot, handle) = result_channel();
        let job = Self {
            closure,
            slot,
            #[cfg(feature = "tracing")]
            span: tracing::Span::current(),
        };
        (job, handle)
    }

    /// ID shared with the job's result handle
    pub fn job_id(&self) -> u64 {
        self.slot.job_id()
    }
}

impl<F, T> Job for PackagedJob<F, T>
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    fn execute(self: Box<Self>) -> JobOutcome {
        let PackagedJob {
            closure,
            slot,
            #[cfg(feature = "tracing")]
            span,
        } = *self;

        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        match catch_unwind(AssertUnwindSafe(closure)) {
            Ok(value) => {
                slot.fulfill(Ok(value));
                JobOutcome::Completed
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let job_id = slot.job_id();
                slot.fulfill(Err(PoolError::job_panicked(job_id, message.clone())));
                JobOutcome::Panicked(message)
            }
        }
    }

    fn job_type(&self) -> &str {
        "PackagedJob"
    }
}

/// Helper to create a fire-and-forget job from a closure
pub struct ClosureJob<F>
where
    F: FnOnce() + Send,
{
    closure: F,
    name: String,
}

impl<F> ClosureJob<F>
where
    F: FnOnce() + Send,
{
    /// Create a new closure job
    pub fn new(closure: F) -> Self {
        Self {
            closure,
            name: "ClosureJob".to_string(),
        }
    }

    /// Create a new closure job with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure,
            name: name.into(),
        }
    }
}

impl<F> Job for ClosureJob<F>
where
    F: FnOnce() + Send,
{
    fn execute(self: Box<Self>) -> JobOutcome {
        let job = *self;
        (job.closure)();
        JobOutcome::Completed
    }

    fn job_type(&self) -> &str {
        &self.name
    }
}
