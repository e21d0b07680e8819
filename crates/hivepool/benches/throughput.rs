//! Empty-task throughput, used as a regression bound rather than an
//! absolute SLA — see SPEC_FULL.md's testable properties section.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use hivepool::{BalancePool, PoolConfig, Submit};

fn submit_one_hundred_thousand_empty_tasks(c: &mut Criterion) {
    let mut group = c.benchmark_group("empty_task_throughput");
    group.sample_size(10);
    group.bench_function("balance_pool_100k_empty_tasks", |b| {
        b.iter_batched(
            || BalancePool::new(PoolConfig::new().num_workers(8)),
            |pool| {
                for _ in 0..100_000 {
                    pool.submit(|| {}).unwrap();
                }
                pool.wait_for_tasks();
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, submit_one_hundred_thousand_empty_tasks);
criterion_main!(benches);
