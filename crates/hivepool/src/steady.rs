//! Fixed-width pool where each worker swaps its whole public queue into a
//! thread-owned drain buffer rather than popping one task at a time.

use crate::{boxed_tasks, submit_for_return_via, Submit};
use hivepool_core::{JoinHandle, PoolResult, Task};
use hivepool_runtime::{FixedPoolBase, OverflowCallback, PoolConfig, WorkerKind};

/// A pool of `num_workers` threads tuned for sustained throughput over
/// many small tasks: producers contend on the same spinlock as
/// [`crate::BalancePool`], but each worker drains its queue in one swap
/// instead of one lock per task.
pub struct SteadyPool {
    base: FixedPoolBase,
}

impl SteadyPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            base: FixedPoolBase::new(WorkerKind::Steady, config),
        }
    }

    pub fn with_overflow_callback(config: PoolConfig, callback: OverflowCallback) -> Self {
        Self {
            base: FixedPoolBase::with_overflow_callback(WorkerKind::Steady, config, Some(callback)),
        }
    }
}

impl Submit for SteadyPool {
    fn submit<F>(&self, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.base.submit(Task::new(f))
    }

    fn submit_for_return<F, T>(&self, f: F) -> PoolResult<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        submit_for_return_via(f, |task| self.base.submit(task))
    }

    fn submit_in_batch<F>(&self, tasks: Vec<F>) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.base.submit_batch(boxed_tasks(tasks))
    }

    fn thread_count(&self) -> usize {
        self.base.thread_count()
    }

    fn tasks_loaded(&self) -> u64 {
        self.base.tasks_loaded()
    }

    fn tasks_submitted(&self) -> u64 {
        self.base.tasks_submitted()
    }

    fn is_closed(&self) -> bool {
        self.base.is_closed()
    }

    fn wait_for_tasks(&self) {
        self.base.wait_for_tasks()
    }

    fn close(&self) {
        self.base.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hivepool_core::PoolError;

    #[test]
    fn submit_for_return_yields_the_computed_value() {
        let pool = SteadyPool::new(PoolConfig::new().num_workers(2));
        let handle = pool.submit_for_return(|| "hive".to_string() + "pool").unwrap();
        assert_eq!(handle.get(), "hivepool");
    }

    #[test]
    fn submitting_after_close_is_refused() {
        let pool = SteadyPool::new(PoolConfig::new().num_workers(1));
        pool.close();
        assert_eq!(pool.submit(|| {}), Err(PoolError::PoolClosed));
    }
}
