//! Core types and traits for the elastic pool

pub mod error;
pub mod handle;
pub mod job;

pub use error::{PoolError, Result};
pub use handle::{result_channel, ResultHandle, ResultSlot};
pub use job::{BoxedJob, ClosureJob, Job, JobOutcome, PackagedJob};
