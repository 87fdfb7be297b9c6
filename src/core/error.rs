//! Error types for the elastic pool

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the elastic pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Work was submitted after shutdown began
    #[error("Pool is shutting down ({pending_jobs} jobs pending); submission rejected")]
    ShuttingDown {
        /// Number of jobs still queued when the submission was rejected
        pending_jobs: usize,
    },

    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn worker thread #{worker_id}: {message}")]
    SpawnError {
        /// ID the worker would have had
        worker_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to join a worker thread
    #[error("Failed to join worker thread #{worker_id}: {message}")]
    JoinError {
        /// ID of the worker that failed to join
        worker_id: usize,
        /// Error message
        message: String,
    },

    /// The submitted callable panicked
    #[error("Job panicked (job_id: {job_id}): {message}")]
    JobPanicked {
        /// ID of the failed job
        job_id: u64,
        /// Panic message
        message: String,
    },

    /// The job was dropped by the pool without running
    #[error("Job abandoned without running (job_id: {job_id})")]
    Abandoned {
        /// ID of the abandoned job
        job_id: u64,
    },

    /// The result was already taken from its handle
    #[error("Result already consumed (job_id: {job_id})")]
    ResultConsumed {
        /// ID of the job whose result was taken
        job_id: u64,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },
}

impl PoolError {
    /// Create a shutting down error
    pub fn shutting_down(pending_jobs: usize) -> Self {
        PoolError::ShuttingDown { pending_jobs }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(worker_id: usize, message: impl Into<String>) -> Self {
        PoolError::JoinError {
            worker_id,
            message: message.into(),
        }
    }

    /// Create a job panicked error
    pub fn job_panicked(job_id: u64, message: impl Into<String>) -> Self {
        PoolError::JobPanicked {
            job_id,
            message: message.into(),
        }
    }

    /// Create an abandoned error
    pub fn abandoned(job_id: u64) -> Self {
        PoolError::Abandoned { job_id }
    }

    /// Create a result consumed error
    pub fn result_consumed(job_id: u64) -> Self {
        PoolError::ResultConsumed { job_id }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error reports a failure of the job itself,
    /// as opposed to misuse of the pool or a pool-side condition.
    pub fn is_job_failure(&self) -> bool {
        matches!(self, PoolError::JobPanicked { .. })
    }
}
