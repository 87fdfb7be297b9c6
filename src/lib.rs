//! # Elastic Thread Pool
//!
//! A self-scaling worker pool: threads are created on demand up to a cap,
//! retire on their own after sitting idle, and are reclaimed without a
//! dedicated supervisor thread.
//!
//! ## Features
//!
//! - **Lazy growth**: a submission that finds no idle worker spawns one, up to `max_workers`
//! - **Idle retirement**: workers idle past the idle timeout exit and are joined by the next retiring worker or at shutdown
//! - **Result handles**: every submission returns a [`ResultHandle`] carrying the return value or the panic
//! - **Non-blocking submission**: the queue is unbounded and FIFO
//! - **Graceful shutdown**: running jobs finish, queued jobs follow the [`ShutdownPolicy`], every worker is joined
//! - **Ordered pipelines**: [`OrderedPipeline`] returns results in submission order with a fixed number in flight
//!
//! ## Quick Start
//!
//! ```rust
//! use elastic_thread_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ElasticPool::with_max_workers(4)?;
//!
//! let handle = pool.submit(|| {
//!     (1..=10u64).product::<u64>()
//! })?;
//! assert_eq!(handle.wait()?, 3_628_800);
//!
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use elastic_thread_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let config = PoolConfig::new(8)
//!     .with_idle_timeout(Duration::from_millis(500))
//!     .with_thread_name_prefix("npu-worker")
//!     .with_shutdown_policy(ShutdownPolicy::Abandon);
//!
//! let pool = ElasticPool::with_config(config)?;
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failures
//!
//! A panicking job does not take its worker down; the panic is delivered
//! through the handle.
//!
//! ```rust
//! use elastic_thread_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ElasticPool::with_max_workers(1)?;
//!
//! let bad = pool.submit(|| -> u32 { panic!("bad frame") })?;
//! assert!(matches!(bad.wait(), Err(PoolError::JobPanicked { .. })));
//!
//! let good = pool.submit(|| 1u32)?;
//! assert_eq!(good.wait()?, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pipeline;
pub mod pool;
pub mod prelude;
pub mod tracing;

pub use crate::core::{
    BoxedJob, ClosureJob, Job, JobOutcome, PackagedJob, PoolError, Result, ResultHandle,
    ResultSlot,
};
pub use pipeline::OrderedPipeline;
pub use pool::{ElasticPool, PoolConfig, PoolStatsSnapshot, ShutdownPolicy};
