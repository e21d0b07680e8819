//! Fixed-width pool with a single spinlock-guarded queue per worker.

use crate::{boxed_tasks, submit_for_return_via, Submit};
use hivepool_core::{JoinHandle, PoolResult, Task};
use hivepool_runtime::{FixedPoolBase, OverflowCallback, PoolConfig, WorkerKind};

/// A pool of `num_workers` threads, each draining its own queue one task
/// at a time. Prefer this over [`crate::SteadyPool`] when tasks are
/// heavier and even distribution across workers matters more than
/// amortizing lock overhead.
pub struct BalancePool {
    base: FixedPoolBase,
}

impl BalancePool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            base: FixedPoolBase::new(WorkerKind::Balance, config),
        }
    }

    /// Build a pool whose `OverflowPolicy::BoundedCallback` refusals are
    /// handed to `callback`.
    pub fn with_overflow_callback(config: PoolConfig, callback: OverflowCallback) -> Self {
        Self {
            base: FixedPoolBase::with_overflow_callback(WorkerKind::Balance, config, Some(callback)),
        }
    }
}

impl Submit for BalancePool {
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
