//! Convenient re-exports for common types and traits

pub use crate::core::{Job, JobOutcome, PoolError, Result, ResultHandle};
pub use crate::pipeline::OrderedPipeline;
pub use crate::pool::{ElasticPool, PoolConfig, PoolStatsSnapshot, ShutdownPolicy};
