//! Ordered frame pipeline example
//!
//! Simulates a video inference loop: each frame is preprocessed and run
//! through a model on the pool, with a fixed number of frames in flight.
//! Inference latency varies per frame, yet results come back in frame order.
//!
//! Run with: `RUST_LOG=debug cargo run --example frame_pipeline`

use elastic_thread_pool::prelude::*;
use rand::Rng;
use std::thread;
use std::time::{Duration, Instant};

const FRAMES: u32 = 48;
const IN_FLIGHT: usize = 4;

#[derive(Debug)]
struct Detection {
    frame: u32,
    boxes: usize,
    latency: Duration,
}

fn preprocess(frame: u32) -> Vec<u8> {
    // Stand-in for resize and color conversion
    (0..64u32).map(|i| ((frame * 31 + i) % 251) as u8).collect()
}

fn infer(frame: u32, pixels: Vec<u8>, latency: Duration) -> Detection {
    let start = Instant::now();
    thread::sleep(latency);
    let boxes = pixels.iter().filter(|&&p| p > 200).count();
    Detection {
        frame,
        boxes,
        latency: start.elapsed(),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = PoolConfig::new(IN_FLIGHT)
        .with_idle_timeout(Duration::from_millis(200))
        .with_thread_name_prefix("npu-worker");
    let pool = ElasticPool::with_config(config)?;
    let mut pipeline = OrderedPipeline::new(&pool, IN_FLIGHT);
    let mut rng = rand::thread_rng();

    println!("=== Frame Pipeline: {} frames, {} in flight ===\n", FRAMES, IN_FLIGHT);
    let start = Instant::now();
    let mut next_expected = 0;

    let mut report = |detection: Detection| {
        assert_eq!(detection.frame, next_expected, "frames out of order");
        next_expected += 1;
        println!(
            "  frame {:>3}: {:>2} boxes in {:>5.1}ms",
            detection.frame,
            detection.boxes,
            detection.latency.as_secs_f64() * 1000.0
        );
    };

    for frame in 0..FRAMES {
        let latency = Duration::from_millis(rng.gen_range(5..40));
        let done = pipeline.push(move || infer(frame, preprocess(frame), latency))?;
        if let Some(result) = done {
            report(result?);
        }
    }
    for result in pipeline.drain() {
        report(result?);
    }

    let elapsed = start.elapsed();
    println!(
        "\nProcessed {} frames in {:.1}ms ({:.1} fps)",
        FRAMES,
        elapsed.as_secs_f64() * 1000.0,
        f64::from(FRAMES) / elapsed.as_secs_f64()
    );

    pool.shutdown()?;
    let stats = pool.stats();
    println!(
        "Workers spawned: {}, peak: {}, avg job: {:.2}μs",
        stats.workers_spawned,
        stats.peak_workers,
        stats.average_processing_time_us()
    );
    println!("Stats: {}", stats.to_json().unwrap_or_default());

    Ok(())
}
