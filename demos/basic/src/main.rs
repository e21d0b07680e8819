//! Basic hivepool example
//!
//! Demonstrates submitting work to each of the three pool variants.

use hivepool::{BalancePool, DynamicPool, OverflowPolicy, PoolConfig, SteadyPool, Submit};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() {
    env_logger::init();
    println!("=== hivepool Basic Example ===\n");

    println!("-- Steady pool: submit_for_return --");
    let steady = SteadyPool::new(PoolConfig::new().num_workers(4));
    let handle = steady.submit_for_return(|| 2023).unwrap();
    println!("steady result: {}", handle.get());
    steady.close();

    println!("\n-- Balance pool: submit_in_batch --");
    let balance = BalancePool::new(
        PoolConfig::new()
            .num_workers(4)
            .overflow_policy(OverflowPolicy::BoundedThrow { capacity: 800 }),
    );
    let completed = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let completed = Arc::clone(&completed);
            move || {
                println!("[balance] task {i} running");
                completed.fetch_add(1, Ordering::SeqCst);
            }
        })
        .collect();
    balance.submit_in_batch(tasks).unwrap();
    balance.wait_for_tasks();
    println!("balance completed: {}", completed.load(Ordering::SeqCst));
    balance.close();

    println!("\n-- Dynamic pool: add/adjust/join_dead --");
    let dynamic = DynamicPool::new(2);
    for i in 0..10 {
        dynamic
            .submit(move || println!("[dynamic] task {i} running"))
            .unwrap();
    }
    dynamic.wait_for_tasks();
    dynamic.add(2).unwrap();
    dynamic.wait_for_threads();
    println!("dynamic running_count after add(2): {}", dynamic.running_count());
    dynamic.adjust(1).unwrap();
    dynamic.wait_for_threads();
    let reaped = dynamic.join_dead();
    println!("dynamic reaped {reaped} worker(s), running_count now {}", dynamic.running_count());
    dynamic.close();
}
