//! Submission-ordered result retrieval over an [`ElasticPool`]
//!
//! Jobs finish in whatever order the workers get through them. A frame
//! processor usually needs results back in the order the inputs arrived,
//! with a bounded number of inputs in flight.
//! [`OrderedPipeline`] keeps the handles of in-flight jobs in a FIFO and
//! always hands back the oldest one first.
//!
//! # Example
//!
//! ```rust
//! use elastic_thread_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ElasticPool::with_max_workers(3)?;
//! let mut pipeline = OrderedPipeline::new(&pool, 3);
//!
//! let mut out = Vec::new();
//! for frame in 0..10u32 {
//!     // Once 3 frames are in flight, each push returns the oldest result
//!     if let Some(done) = pipeline.push(move || frame * 10)? {
//!         out.push(done?);
//!     }
//! }
//! for done in pipeline.drain() {
//!     out.push(done?);
//! }
//!
//! assert_eq!(out, (0..10).map(|f| f * 10).collect::<Vec<_>>());
//! # Ok(())
//! # }
//! ```

use crate::core::{ResultHandle, Result};
use crate::pool::ElasticPool;
use std::collections::VecDeque;

/// Keeps up to `depth` jobs in flight and yields results in submission order
#[derive(Debug)]
pub struct OrderedPipeline<'pool, T> {
    pool: &'pool ElasticPool,
    in_flight: VecDeque<ResultHandle<T>>,
    depth: usize,
}

impl<'pool, T: Send + 'static> OrderedPipeline<'pool, T> {
    /// Create a pipeline over `pool` keeping `depth` jobs in flight
    ///
    /// A depth of 0 is treated as 1.
    pub fn new(pool: &'pool ElasticPool, depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            pool,
            in_flight: VecDeque::with_capacity(depth + 1),
            depth,
        }
    }

    /// Number of jobs kept in flight before `push` starts returning results
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of jobs submitted whose results have not been retrieved
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Submit a job without retrieving anything
    ///
    /// # Errors
    ///
    /// Returns the pool's submission error; nothing is added to the
    /// pipeline in that case.
    pub fn put<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let handle = self.pool.submit(f)?;
        self.in_flight.push_back(handle);
        Ok(())
    }

    /// Submit a job, then return the oldest result once more than `depth`
    /// jobs are in flight
    pub fn push<F>(&mut self, f: F) -> Result<Option<Result<T>>>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.put(f)?;
        if self.in_flight.len() > self.depth {
            Ok(self.get())
        } else {
            Ok(None)
        }
    }

    /// Wait for the oldest in-flight result
    ///
    /// Returns `None` when nothing is in flight.
    pub fn get(&mut self) -> Option<Result<T>> {
        self.in_flight.pop_front().map(ResultHandle::wait)
    }

    /// Take the oldest result only if it is already available
    pub fn try_get(&mut self) -> Option<Result<T>> {
        let outcome = self.in_flight.front_mut()?.try_wait()?;
        self.in_flight.pop_front();
        Some(outcome)
    }

    /// Wait for every remaining result, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = Result<T>> + '_ {
        self.in_flight.drain(..).map(ResultHandle::wait)
    }
}
