//! Empty-task throughput benchmark across all three pool variants.
//!
//! Not a substitute for `cargo bench`'s criterion suite — this is the
//! quick, runnable comparison you reach for first.

use hivepool::{BalancePool, DynamicPool, PoolConfig, SteadyPool, Submit};
use std::time::Instant;

const TASKS: usize = 200_000;
const WORKERS: usize = 8;

fn main() {
    env_logger::init();
    println!("=== hivepool Benchmark: {TASKS} empty tasks, {WORKERS} workers ===\n");

    {
        let pool = SteadyPool::new(PoolConfig::new().num_workers(WORKERS));
        let start = Instant::now();
        for _ in 0..TASKS {
            pool.submit(|| {}).unwrap();
        }
        pool.wait_for_tasks();
        report("Steady", start.elapsed());
    }

    {
        let pool = BalancePool::new(PoolConfig::new().num_workers(WORKERS));
        let start = Instant::now();
        for _ in 0..TASKS {
            pool.submit(|| {}).unwrap();
        }
        pool.wait_for_tasks();
        report("Balance", start.elapsed());
    }

    {
        let pool = DynamicPool::new(WORKERS);
        let start = Instant::now();
        for _ in 0..TASKS {
            pool.submit(|| {}).unwrap();
        }
        pool.wait_for_tasks();
        report("Dynamic", start.elapsed());
    }
}

fn report(name: &str, elapsed: std::time::Duration) {
    let per_sec = TASKS as f64 / elapsed.as_secs_f64();
    println!("{name:<8} {:>8.3}s  ({per_sec:.0} tasks/sec)", elapsed.as_secs_f64());
}
