//! Elastic pool and worker implementations

pub mod config;
pub(crate) mod state;
pub mod stats;
pub mod thread_pool;
mod worker;

pub use config::{PoolConfig, ShutdownPolicy, DEFAULT_IDLE_TIMEOUT};
pub use stats::{PoolStats, PoolStatsSnapshot};
pub use thread_pool::ElasticPool;
