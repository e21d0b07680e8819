//! Shared-queue pool whose worker count can be changed at runtime.
//!
//! Every worker blocks on the same `Mutex<VecDeque<Task>>` + `Condvar`
//! rather than owning a queue of its own, so there is nothing to load
//! balance across: growing or shrinking the pool only means starting or
//! stopping threads that all pull from the one queue.

use crate::control::PoolControlBlock;
use hivepool_core::env::env_get;
use hivepool_core::{PoolError, PoolResult, Task, WorkerId};
use log::debug;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

struct SharedQueue {
    inner: Mutex<VecDeque<Task>>,
    cond: Condvar,
}

impl SharedQueue {
    fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
        }
    }

    fn push(&self, task: Task) {
        self.inner.lock().unwrap().push_back(task);
        self.cond.notify_one();
    }

    fn push_batch(&self, tasks: Vec<Task>) {
        self.inner.lock().unwrap().extend(tasks);
        self.cond.notify_all();
    }

    fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Pop the next task, waiting up to `timeout` at a time while `running`
    /// holds. Drains whatever remains even after `running` flips to false,
    /// so a close never strands admitted-but-unexecuted tasks.
    fn pop_wait(&self, running: &AtomicBool, timeout: Duration) -> Option<Task> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if let Some(task) = guard.pop_front() {
                return Some(task);
            }
            if !running.load(Ordering::Acquire) {
                return None;
            }
            let (g, _) = self.cond.wait_timeout(guard, timeout).unwrap();
            guard = g;
        }
    }
}

fn park_timeout() -> Duration {
    Duration::from_millis(env_get("HIVEPOOL_PARK_TIMEOUT_MS", 20))
}

struct DynamicWorker {
    id: WorkerId,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

/// A pool whose worker count can be grown or shrunk while it is running.
pub struct DynamicPool {
    queue: Arc<SharedQueue>,
    control: Arc<PoolControlBlock>,
    workers: Mutex<Vec<DynamicWorker>>,
    next_id: AtomicU32,
    /// Declared target worker count. Updated synchronously by `add`/`del`
    /// so `expected_count()` reflects the caller's intent immediately,
    /// independent of how long the signaled threads take to actually exit.
    expected: AtomicUsize,
}

impl DynamicPool {
    /// Build a pool starting with `initial_workers` threads.
    pub fn new(initial_workers: usize) -> Self {
        let pool = Self {
            queue: Arc::new(SharedQueue::new()),
            control: Arc::new(PoolControlBlock::new()),
            workers: Mutex::new(Vec::new()),
            next_id: AtomicU32::new(0),
            expected: AtomicUsize::new(0),
        };
        pool.add(initial_workers).expect("a freshly built pool is never closed");
        pool
    }

    pub fn tasks_loaded(&self) -> u64 {
        self.control.task_loaded()
    }

    pub fn tasks_submitted(&self) -> u64 {
        self.control.total_tasks()
    }

    pub fn is_closed(&self) -> bool {
        self.control.is_closed()
    }

    pub fn wait_for_tasks(&self) {
        self.control.wait_for_tasks();
    }

    pub fn submit(&self, task: Task) -> PoolResult<()> {
        if self.control.is_closed() {
            return Err(PoolError::PoolClosed);
        }
        self.control.record_submitted(1);
        self.queue.push(task);
        Ok(())
    }

    pub fn submit_batch(&self, tasks: Vec<Task>) -> PoolResult<()> {
        if self.control.is_closed() {
            return Err(PoolError::PoolClosed);
        }
        if tasks.is_empty() {
            return Ok(());
        }
        self.control.record_submitted(tasks.len() as u64);
        self.queue.push_batch(tasks);
        Ok(())
    }

    /// Start `count` additional worker threads. Refused with
    /// `PoolError::InvalidLifecycle` once the pool is closed.
    pub fn add(&self, count: usize) -> PoolResult<()> {
        if self.control.is_closed() {
            return Err(PoolError::InvalidLifecycle("pool is closed"));
        }
        if count == 0 {
            return Ok(());
        }
        debug!("adding {count} dynamic worker(s)");
        self.expected.fetch_add(count, Ordering::Relaxed);
        let mut workers = self.workers.lock().unwrap();
        for _ in 0..count {
            let id = WorkerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
            let running = Arc::new(AtomicBool::new(true));
            let queue = Arc::clone(&self.queue);
            let control = Arc::clone(&self.control);
            let thread_running = Arc::clone(&running);
            let handle = thread::Builder::new()
                .name(format!("hivepool-dynamic-{}", id))
                .spawn(move || dynamic_loop(queue, control, thread_running))
                .expect("failed to spawn hivepool dynamic worker thread");
            workers.push(DynamicWorker {
                id,
                running,
                handle: Some(handle),
            });
        }
        Ok(())
    }

    /// Signal up to `count` running workers to stop, starting from the most
    /// recently added, and lower `expected_count()` by however many were
    /// actually signaled. Requesting more than are currently running stops
    /// them all and floors `expected_count()` at 0; it is not an error.
    /// Stopped workers are not joined until `join_dead` or `close` is
    /// called. Refused with `PoolError::InvalidLifecycle` once the pool is
    /// closed.
    pub fn del(&self, count: usize) -> PoolResult<usize> {
        if self.control.is_closed() {
            return Err(PoolError::InvalidLifecycle("pool is closed"));
        }
        let workers = self.workers.lock().unwrap();
        let mut stopped = 0;
        for worker in workers.iter().rev() {
            if stopped == count {
                break;
            }
            if worker.running.swap(false, Ordering::AcqRel) {
                stopped += 1;
            }
        }
        drop(workers);
        self.expected
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(stopped))
            })
            .unwrap();
        self.queue.cond.notify_all();
        debug!("signaled {stopped} dynamic worker(s) to stop (requested {count})");
        Ok(stopped)
    }

    /// Grow or shrink the declared target towards `target` worker threads.
    /// `expected_count()` reflects `target` as soon as this returns;
    /// `running_count()` converges to it as signaled workers finish their
    /// current task and exit. Refused with `PoolError::InvalidLifecycle`
    /// once the pool is closed.
    pub fn adjust(&self, target: usize) -> PoolResult<()> {
        if self.control.is_closed() {
            return Err(PoolError::InvalidLifecycle("pool is closed"));
        }
        let current = self.expected_count();
        debug!("adjusting dynamic pool from {current} to {target} worker(s)");
        if target > current {
            self.add(target - current)
        } else if target < current {
            self.del(current - target).map(|_| ())
        } else {
            Ok(())
        }
    }

    /// Join and drop any worker thread that has finished, reclaiming its
    /// slot. Returns how many were reaped.
    pub fn join_dead(&self) -> usize {
        let mut workers = self.workers.lock().unwrap();
        let before = workers.len();
        let mut alive = Vec::with_capacity(before);
        for mut worker in workers.drain(..) {
            let finished = worker
                .handle
                .as_ref()
                .map(|h| h.is_finished())
                .unwrap_or(true);
            if finished {
                if let Some(handle) = worker.handle.take() {
                    let _ = handle.join();
                }
            } else {
                alive.push(worker);
            }
        }
        let reaped = before - alive.len();
        *workers = alive;
        if reaped > 0 {
            debug!("reaped {reaped} dead dynamic worker(s)");
        }
        reaped
    }

    /// Worker threads whose OS thread has not yet exited. Unlike
    /// `expected_count()`, this lags behind a `del`: a signaled worker keeps
    /// counting here until it actually finishes its current task and its
    /// run loop returns.
    pub fn running_count(&self) -> usize {
        self.workers
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false))
            .count()
    }

    /// Block until `running_count()` catches up with `expected_count()`,
    /// i.e. every signaled `del` has actually exited and every `add` has
    /// started. Polls rather than parking on a condvar, since convergence
    /// here is typically sub-millisecond once `del`'s `notify_all` wakes
    /// idle workers.
    pub fn wait_for_threads(&self) {
        while self.running_count() != self.expected_count() {
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Declared target worker count, set by the most recent `add`/`del`/
    /// `adjust` call. Unlike `running_count()`, this updates synchronously
    /// and does not wait for signaled workers to actually exit.
    pub fn expected_count(&self) -> usize {
        self.expected.load(Ordering::Relaxed)
    }

    /// Completed-task throughput (tasks/sec) sampled over `interval`. Blocks
    /// the calling thread for the duration of the sample.
    pub fn sample_throughput(&self, interval: Duration) -> f64 {
        let before = self.control.total_completed();
        thread::sleep(interval);
        let after = self.control.total_completed();
        (after - before) as f64 / interval.as_secs_f64()
    }

    /// Queue depth, for diagnostics.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn close(&self) {
        if !self.control.mark_closed() {
            return;
        }
        let mut workers = self.workers.lock().unwrap();
        for worker in workers.iter() {
            worker.running.store(false, Ordering::Release);
        }
        self.queue.cond.notify_all();
        for worker in workers.iter_mut() {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
        workers.clear();
    }
}

impl Drop for DynamicPool {
    fn drop(&mut self) {
        self.close();
    }
}

/// A panicking task is fatal to its worker thread by contract (see
/// SPEC_FULL.md §7): the panic is logged and then resumed rather than
/// swallowed, so the thread actually dies. Callers may `add(1)` to
/// compensate for the lost worker.
fn dynamic_loop(queue: Arc<SharedQueue>, control: Arc<PoolControlBlock>, running: Arc<AtomicBool>) {
    let timeout = park_timeout();
    while let Some(task) = queue.pop_wait(&running, timeout) {
        if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| task.invoke())) {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            log::error!("hivepool dynamic task panicked: {}", msg);
            std::panic::resume_unwind(payload);
        }
        control.record_completed(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn submit_and_wait_for_tasks() {
        let pool = DynamicPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..200 {
            let c = Arc::clone(&counter);
            pool.submit(Task::new(move || { c.fetch_add(1, Ordering::SeqCst); })).unwrap();
        }
        pool.wait_for_tasks();
        assert_eq!(counter.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn add_and_del_change_running_count() {
        let pool = DynamicPool::new(2);
        pool.wait_for_threads();
        assert_eq!(pool.running_count(), 2);
        pool.add(3).unwrap();
        pool.wait_for_threads();
        assert_eq!(pool.running_count(), 5);
        let stopped = pool.del(2).unwrap();
        assert_eq!(stopped, 2);
        pool.wait_for_threads();
        assert_eq!(pool.running_count(), 3);
    }

    #[test]
    fn del_past_running_count_stops_everyone() {
        let pool = DynamicPool::new(3);
        let stopped = pool.del(100).unwrap();
        assert_eq!(stopped, 3);
        pool.wait_for_threads();
        assert_eq!(pool.running_count(), 0);
    }

    #[test]
    fn join_dead_reaps_stopped_workers() {
        let pool = DynamicPool::new(2);
        pool.del(1).unwrap();
        // Give the stopped worker a moment to notice and exit.
        std::thread::sleep(Duration::from_millis(100));
        let reaped = pool.join_dead();
        assert_eq!(reaped, 1);
        assert_eq!(pool.expected_count(), 1);
    }

    #[test]
    fn lifecycle_mutation_after_close_is_refused() {
        let pool = DynamicPool::new(1);
        pool.close();
        assert_eq!(pool.add(1), Err(PoolError::InvalidLifecycle("pool is closed")));
        assert_eq!(pool.del(1), Err(PoolError::InvalidLifecycle("pool is closed")));
        assert_eq!(pool.adjust(5), Err(PoolError::InvalidLifecycle("pool is closed")));
    }

    #[test]
    fn adjust_grows_and_shrinks_towards_target() {
        let pool = DynamicPool::new(1);
        pool.adjust(4).unwrap();
        assert_eq!(pool.expected_count(), 4);
        pool.adjust(1).unwrap();
        pool.wait_for_threads();
        assert_eq!(pool.running_count(), 1);
    }

    #[test]
    fn close_drains_queued_tasks_before_exiting() {
        let pool = DynamicPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let c = Arc::clone(&counter);
            pool.submit(Task::new(move || { c.fetch_add(1, Ordering::SeqCst); })).unwrap();
        }
        pool.close();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert!(pool.submit(Task::new(|| {})).is_err());
    }
}
