//! Facade over [`hivepool_runtime::DynamicPool`] adding the `Submit`
//! surface and the boxed-closure ergonomics the other two pools get from
//! `FixedPoolBase`.

use crate::{boxed_tasks, submit_for_return_via, Submit};
use hivepool_core::{JoinHandle, PoolResult, Task};
use std::time::Duration;

/// A pool whose worker count can be grown or shrunk while it is running.
/// All workers share one queue, so there is no load balancer and no
/// per-worker capacity: admission is always unbounded.
pub struct DynamicPool {
    inner: hivepool_runtime::DynamicPool,
}

impl DynamicPool {
    /// Build a pool starting with `initial_workers` threads.
    pub fn new(initial_workers: usize) -> Self {
        Self {
            inner: hivepool_runtime::DynamicPool::new(initial_workers),
        }
    }

    /// Start `count` additional worker threads. Refused with
    /// `PoolError::InvalidLifecycle` once the pool is closed.
    pub fn add(&self, count: usize) -> PoolResult<()> {
        self.inner.add(count)
    }

    /// Signal up to `count` running workers to stop, most-recently-added
    /// first. Requesting more than are running stops them all. Returns the
    /// number actually signaled, or `PoolError::InvalidLifecycle` once the
    /// pool is closed.
    pub fn del(&self, count: usize) -> PoolResult<usize> {
        self.inner.del(count)
    }

    /// Grow or shrink towards `target` running workers. Refused with
    /// `PoolError::InvalidLifecycle` once the pool is closed.
    pub fn adjust(&self, target: usize) -> PoolResult<()> {
        self.inner.adjust(target)
    }

    /// Join and reclaim any worker thread that has already stopped.
    /// Returns how many were reaped.
    pub fn join_dead(&self) -> usize {
        self.inner.join_dead()
    }

    /// Worker threads whose OS thread has not yet exited.
    pub fn running_count(&self) -> usize {
        self.inner.running_count()
    }

    /// Block until `running_count()` catches up with `expected_count()`.
    pub fn wait_for_threads(&self) {
        self.inner.wait_for_threads()
    }

    /// Total tracked worker slots, including ones winding down but not yet
    /// reaped by `join_dead`.
    pub fn expected_count(&self) -> usize {
        self.inner.expected_count()
    }

    /// Completed-task throughput (tasks/sec) sampled over `interval`.
    /// Blocks the calling thread for the duration of the sample.
    pub fn sample_throughput(&self, interval: Duration) -> f64 {
        self.inner.sample_throughput(interval)
    }

    /// Number of tasks currently waiting in the shared queue.
    pub fn queue_len(&self) -> usize {
        self.inner.queue_len()
    }
}

impl Submit for DynamicPool {
    fn submit<F>(&self, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.submit(Task::new(f))
    }

    fn submit_for_return<F, T>(&self, f: F) -> PoolResult<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        submit_for_return_via(f, |task| self.inner.submit(task))
    }

    fn submit_in_batch<F>(&self, tasks: Vec<F>) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.submit_batch(boxed_tasks(tasks))
    }

    fn thread_count(&self) -> usize {
        self.inner.running_count()
    }

    fn tasks_loaded(&self) -> u64 {
        self.inner.tasks_loaded()
    }

    fn tasks_submitted(&self) -> u64 {
        self.inner.tasks_submitted()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn wait_for_tasks(&self) {
        self.inner.wait_for_tasks()
    }

    fn close(&self) {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn dynamic_pool_runs_submitted_tasks_in_order_per_producer() {
        let pool = DynamicPool::new(1);
        let results = Arc::new(std::sync::Mutex::new(Vec::new()));
        for i in 0..20 {
            let results = Arc::clone(&results);
            pool.submit(move || {
                results.lock().unwrap().push(i);
            })
            .unwrap();
        }
        pool.wait_for_tasks();
        let results = results.lock().unwrap();
        assert_eq!(*results, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn adjust_and_join_dead_reclaim_threads() {
        let pool = DynamicPool::new(4);
        pool.adjust(1).unwrap();
        pool.wait_for_threads();
        pool.join_dead();
        assert_eq!(pool.expected_count(), 1);
        assert_eq!(pool.running_count(), 1);
    }

    #[test]
    fn scaling_a_closed_pool_is_refused() {
        use hivepool_core::PoolError;
        let pool = DynamicPool::new(1);
        pool.close();
        assert_eq!(pool.add(1), Err(PoolError::InvalidLifecycle("pool is closed")));
        assert_eq!(pool.adjust(3), Err(PoolError::InvalidLifecycle("pool is closed")));
    }

    #[test]
    fn concurrent_producers_all_complete() {
        let pool = Arc::new(DynamicPool::new(4));
        let counter = Arc::new(AtomicUsize::new(0));
        let mut producers = Vec::new();
        for _ in 0..4 {
            let pool = Arc::clone(&pool);
            let counter = Arc::clone(&counter);
            producers.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    let c = Arc::clone(&counter);
                    pool.submit(move || {
                        c.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
                }
            }));
        }
        for p in producers {
            p.join().unwrap();
        }
        pool.wait_for_tasks();
        assert_eq!(counter.load(Ordering::SeqCst), 200);
    }
}
