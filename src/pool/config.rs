//! Configuration for the elastic pool

use crate::core::{PoolError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time an idle worker waits for work before retiring
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2);

/// What happens to jobs that are still queued when shutdown begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownPolicy {
    /// Workers keep dequeuing until the queue is empty, so every accepted
    /// job runs before shutdown returns
    #[default]
    Drain,
    /// Jobs not yet picked up are dropped; their handles resolve to
    /// [`PoolError::Abandoned`]
    Abandon,
}

/// Configuration for the elastic pool
///
/// # Example
///
/// ```rust
/// use elastic_thread_pool::prelude::*;
/// use std::time::Duration;
///
/// let config = PoolConfig::new(8)
///     .with_idle_timeout(Duration::from_millis(500))
///     .with_thread_name_prefix("inference")
///     .with_shutdown_policy(ShutdownPolicy::Abandon);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on live worker threads; must be at least 1.
    /// [`PoolConfig::new`] substitutes the number of CPUs for 0, a
    /// deserialized or hand-set 0 is rejected by [`validate`](Self::validate).
    pub max_workers: usize,
    /// How long an idle worker waits for work before retiring.
    /// Default: 2s
    pub idle_timeout: Duration,
    /// Thread name prefix; workers are named `{prefix}-{id}`
    pub thread_name_prefix: String,
    /// Stack size for worker threads (None = platform default)
    pub stack_size: Option<usize>,
    /// Handling of queued jobs at shutdown
    pub shutdown_policy: ShutdownPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            thread_name_prefix: "elastic-worker".to_string(),
            stack_size: None,
            shutdown_policy: ShutdownPolicy::default(),
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with the given worker cap
    #[must_use]
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: if max_workers == 0 {
                num_cpus::get()
            } else {
                max_workers
            },
            ..Default::default()
        }
    }

    /// Set the idle timeout after which a worker with no work retires
    ///
    /// Short timeouts release threads quickly after a burst; long timeouts
    /// keep warm workers around for the next one.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the stack size of worker threads in bytes
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Set the shutdown policy for queued jobs
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(PoolError::invalid_config(
                "max_workers",
                "Worker cap must be greater than 0",
            ));
        }
        if self.idle_timeout.is_zero() {
            return Err(PoolError::invalid_config(
                "idle_timeout",
                "Idle timeout must be non-zero",
            ));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(PoolError::invalid_config(
                "thread_name_prefix",
                "Thread names cannot contain null bytes",
            ));
        }
        if self.stack_size == Some(0) {
            return Err(PoolError::invalid_config(
                "stack_size",
                "Stack size must be greater than 0",
            ));
        }
        Ok(())
    }
}
