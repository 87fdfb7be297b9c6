//! Basic elastic pool usage example
//!
//! Demonstrates on-demand growth, result handles, idle retirement and
//! statistics tracking.
//!
//! Run with: cargo run --example basic_usage

use elastic_thread_pool::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Elastic Thread Pool - Basic Usage Example ===\n");

    let config = PoolConfig::new(4).with_idle_timeout(Duration::from_millis(300));
    let pool = ElasticPool::with_config(config)?;

    println!(
        "1. Created pool capped at {} workers ({} live)",
        pool.max_workers(),
        pool.current_worker_count()
    );

    println!("\n2. Submitting jobs with result handles:");
    let handles = (0..10u64)
        .map(|i| {
            pool.submit(move || {
                println!(
                    "  Job {} executing on {}",
                    i,
                    thread::current().name().unwrap_or("unnamed")
                );
                thread::sleep(Duration::from_millis(50));
                i * i
            })
        })
        .collect::<Result<Vec<_>>>()?;
    println!("   Submitted 10 jobs, pool grew to {} workers", pool.current_worker_count());

    let squares = handles
        .into_iter()
        .map(ResultHandle::wait)
        .collect::<Result<Vec<_>>>()?;
    println!("   Results: {:?}", squares);

    println!("\n3. A panicking job only fails its own handle:");
    let bad = pool.submit(|| -> u64 { panic!("corrupt input") })?;
    match bad.wait() {
        Err(e) => println!("   Handle reported: {}", e),
        Ok(v) => println!("   Unexpected value: {}", v),
    }

    println!("\n4. Waiting for idle workers to retire...");
    thread::sleep(Duration::from_millis(600));
    println!("   Live workers now: {}", pool.current_worker_count());

    println!("\n5. Submitting after the pool shrank:");
    let handle = pool.submit(|| "grown back")?;
    println!("   {} ({} live)", handle.wait()?, pool.current_worker_count());

    println!("\n6. Shutting down...");
    pool.shutdown()?;

    let stats = pool.stats();
    println!("\n7. Final statistics:");
    println!("   Jobs submitted: {}", stats.jobs_submitted);
    println!("   Jobs completed: {}", stats.jobs_completed);
    println!("   Jobs panicked: {}", stats.jobs_panicked);
    println!("   Workers spawned: {}", stats.workers_spawned);
    println!("   Workers retired on idle: {}", stats.workers_retired);
    println!("   Workers joined: {}", stats.workers_joined);
    println!("   Peak workers: {}", stats.peak_workers);
    println!(
        "   Avg processing time: {:.2}μs",
        stats.average_processing_time_us()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
