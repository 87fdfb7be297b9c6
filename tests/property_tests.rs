//! Property-based tests for elastic_thread_pool using proptest

use elastic_thread_pool::prelude::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// PoolConfig Tests
// ============================================================================

proptest! {
    /// Any positive cap and non-zero timeout is a valid configuration
    #[test]
    fn test_config_accepts_positive_values(
        max_workers in 1usize..64,
        idle_ms in 1u64..10_000,
        prefix in "[a-z]{3,10}"
    ) {
        let config = PoolConfig::new(max_workers)
            .with_idle_timeout(Duration::from_millis(idle_ms))
            .with_thread_name_prefix(&prefix);

        prop_assert!(config.validate().is_ok());
        prop_assert_eq!(config.max_workers, max_workers);
        prop_assert_eq!(config.thread_name_prefix, prefix);
    }

    /// Configuration survives a JSON round trip
    #[test]
    fn test_config_json_round_trip(max_workers in 1usize..64, idle_ms in 1u64..10_000) {
        let config = PoolConfig::new(max_workers)
            .with_idle_timeout(Duration::from_millis(idle_ms));
        let json = serde_json::to_string(&config).expect("serialize config");
        let parsed: PoolConfig = serde_json::from_str(&json).expect("parse config");

        prop_assert_eq!(parsed.max_workers, max_workers);
        prop_assert_eq!(parsed.idle_timeout, Duration::from_millis(idle_ms));
    }
}

// ============================================================================
// Pool Behaviour Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// The live worker count never exceeds the cap
    #[test]
    fn test_worker_count_within_cap(max_workers in 1usize..6, jobs in 1usize..60) {
        let pool = ElasticPool::with_max_workers(max_workers).expect("Failed to create pool");

        let mut handles = Vec::with_capacity(jobs);
        for i in 0..jobs {
            handles.push(pool.submit(move || i).expect("Failed to submit job"));
            prop_assert!(pool.current_worker_count() <= max_workers);
        }
        for handle in handles {
            handle.wait().expect("Job should complete");
        }

        prop_assert!(pool.stats().peak_workers <= max_workers);
        pool.shutdown().expect("Failed to shutdown pool");
        prop_assert_eq!(pool.current_worker_count(), 0);
    }

    /// Every submitted job produces exactly its own result
    #[test]
    fn test_every_result_is_retrieved(
        max_workers in 1usize..6,
        inputs in prop::collection::vec(any::<u32>(), 1..80)
    ) {
        let pool = ElasticPool::with_max_workers(max_workers).expect("Failed to create pool");
        let runs = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = inputs
            .iter()
            .map(|&x| {
                let runs = Arc::clone(&runs);
                pool.submit(move || {
                    runs.fetch_add(1, Ordering::Relaxed);
                    u64::from(x) * 2
                })
                .expect("Failed to submit job")
            })
            .collect();

        for (handle, &x) in handles.into_iter().zip(inputs.iter()) {
            prop_assert_eq!(handle.wait().expect("Job should complete"), u64::from(x) * 2);
        }
        pool.shutdown().expect("Failed to shutdown pool");
        prop_assert_eq!(runs.load(Ordering::Relaxed), inputs.len());
        prop_assert_eq!(pool.stats().jobs_completed as usize, inputs.len());
    }

    /// Shutdown joins every worker that was ever spawned
    #[test]
    fn test_shutdown_joins_all_spawned(max_workers in 1usize..6, jobs in 0usize..40) {
        let pool = ElasticPool::with_max_workers(max_workers).expect("Failed to create pool");
        for _ in 0..jobs {
            pool.execute(|| std::thread::yield_now()).expect("Failed to submit job");
        }

        pool.shutdown().expect("Failed to shutdown pool");
        let stats = pool.stats();
        prop_assert_eq!(stats.workers_joined, stats.workers_spawned);
        prop_assert_eq!(stats.jobs_completed as usize, jobs);
    }

    /// A pipeline returns results in submission order whatever its depth
    #[test]
    fn test_pipeline_preserves_order(depth in 0usize..8, count in 0usize..40) {
        let pool = ElasticPool::with_max_workers(4).expect("Failed to create pool");
        let mut pipeline = OrderedPipeline::new(&pool, depth);

        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            if let Some(done) = pipeline.push(move || i).expect("Failed to submit job") {
                out.push(done.expect("Job should complete"));
            }
            prop_assert!(pipeline.in_flight() <= pipeline.depth());
        }
        for done in pipeline.drain() {
            out.push(done.expect("Job should complete"));
        }

        prop_assert_eq!(out, (0..count).collect::<Vec<_>>());
    }
}
