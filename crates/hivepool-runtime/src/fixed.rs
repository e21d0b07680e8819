//! Shared logic for the fixed-width pool variants (Balance and Steady):
//! worker spawning, the load balancer, admission (including overflow
//! handling), and lifecycle (`wait_for_tasks`/`close`).
//!
//! `BalancePool` and `SteadyPool` in the `hivepool` facade crate are thin
//! wrappers around a `FixedPoolBase` constructed with a different
//! `WorkerKind`.

use crate::config::{OverflowPolicy, PoolConfig};
use crate::control::PoolControlBlock;
use crate::queue::AdmissionQueue;
use crate::worker::{self, WorkerKind, WorkerSlot};
use hivepool_core::env::env_get;
use hivepool_core::{PoolError, PoolResult, Task};
use log::warn;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A closure invoked with tasks that a `BoundedCallback` policy refused to
/// queue.
pub type OverflowCallback = Arc<dyn Fn(Vec<Task>) + Send + Sync>;

pub struct FixedPoolBase {
    workers: Vec<Arc<WorkerSlot>>,
    control: Arc<PoolControlBlock>,
    cursor: AtomicUsize,
    shallow_threshold: usize,
    overflow_policy: OverflowPolicy,
    overflow_callback: Option<OverflowCallback>,
}

impl FixedPoolBase {
    pub fn new(kind: WorkerKind, config: PoolConfig) -> Self {
        Self::with_overflow_callback(kind, config, None)
    }

    pub fn with_overflow_callback(
        kind: WorkerKind,
        config: PoolConfig,
        overflow_callback: Option<OverflowCallback>,
    ) -> Self {
        config.validate().expect("invalid pool configuration");
        if matches!(config.overflow_policy, OverflowPolicy::BoundedCallback { .. }) {
            assert!(
                overflow_callback.is_some(),
                "OverflowPolicy::BoundedCallback requires an overflow callback"
            );
        }
        let control = Arc::new(PoolControlBlock::new());
        let shallow_threshold = env_get("HIVEPOOL_SHALLOW_THRESHOLD", 1usize);
        let workers = (0..config.num_workers)
            .map(|_| worker::spawn(kind, Arc::clone(&control)))
            .collect();
        Self {
            workers,
            control,
            cursor: AtomicUsize::new(0),
            shallow_threshold,
            overflow_policy: config.overflow_policy,
            overflow_callback,
        }
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
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

    /// Scan forward from the cursor for an idle or shallow worker. On a
    /// hit, the cursor advances to just past the chosen worker; if nothing
    /// qualifies, the cursor itself is used as a fallback and advances by
    /// one, spreading load round-robin.
    fn choose_worker(&self) -> usize {
        let n = self.workers.len();
        let start = self.cursor.load(Ordering::Relaxed) % n;
        for offset in 0..n {
            let idx = (start + offset) % n;
            let worker = &self.workers[idx];
            if worker.is_waiting.load(Ordering::Relaxed) || worker.queue.len() <= self.shallow_threshold {
                self.cursor.store((idx + 1) % n, Ordering::Relaxed);
                return idx;
            }
        }
        self.cursor.store((start + 1) % n, Ordering::Relaxed);
        start
    }

    pub fn submit(&self, task: Task) -> PoolResult<()> {
        if self.control.is_closed() {
            return Err(PoolError::PoolClosed);
        }
        let idx = self.choose_worker();
        self.admit_one(idx, task)?;
        self.control.record_submitted(1);
        self.workers[idx].parker.wake();
        Ok(())
    }

    fn admit_one(&self, idx: usize, task: Task) -> PoolResult<()> {
        let capacity = self.overflow_policy.capacity();
        match self.workers[idx].queue.try_push(task, capacity) {
            Ok(()) => Ok(()),
            Err(task) => self.handle_refused(idx, task),
        }
    }

    fn handle_refused(&self, idx: usize, task: Task) -> PoolResult<()> {
        match self.overflow_policy {
            OverflowPolicy::Unbounded => unreachable!("unbounded admission never refuses"),
            OverflowPolicy::BoundedThrow { capacity } => {
                warn!("admission refused on worker {idx}: queue at capacity ({capacity})");
                Err(PoolError::AdmissionRefused { capacity })
            }
            OverflowPolicy::BoundedCallback { capacity } => {
                warn!("admission overflow on worker {idx} (capacity {capacity}): handing off to overflow callback");
                if let Some(cb) = &self.overflow_callback {
                    cb(vec![task]);
                }
                Ok(())
            }
            OverflowPolicy::BoundedBlock { capacity } => {
                warn!("admission blocked on worker {idx}: queue at capacity ({capacity}), waiting for room");
                let queue = &self.workers[idx].queue;
                self.control.wait_until(|| queue.len() < capacity);
                if self.control.is_closed() {
                    return Err(PoolError::PoolClosed);
                }
                // Space may have been taken by another producer; retry the
                // push, falling back to waiting again if so.
                let mut task = task;
                loop {
                    match queue.try_push(task, Some(capacity)) {
                        Ok(()) => return Ok(()),
                        Err(t) => {
                            task = t;
                            self.control.wait_until(|| queue.len() < capacity);
                            if self.control.is_closed() {
                                return Err(PoolError::PoolClosed);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Admit a batch of tasks. Unbounded pools push the whole batch onto a
    /// single chosen worker under one lock acquisition. Bounded pools admit
    /// tasks one at a time (partial admission): tasks that fit are queued,
    /// the remainder follows the configured overflow policy.
    pub fn submit_batch(&self, tasks: Vec<Task>) -> PoolResult<()> {
        if self.control.is_closed() {
            return Err(PoolError::PoolClosed);
        }
        if tasks.is_empty() {
            return Ok(());
        }
        let n = tasks.len() as u64;
        if matches!(self.overflow_policy, OverflowPolicy::Unbounded) {
            let idx = self.choose_worker();
            self.workers[idx].queue.push_batch_unlimited(tasks);
            self.control.record_submitted(n);
            self.workers[idx].parker.wake();
            return Ok(());
        }

        let idx = self.choose_worker();
        for task in tasks {
            self.admit_one(idx, task)?;
            self.control.record_submitted(1);
        }
        self.workers[idx].parker.wake();
        Ok(())
    }

    /// Close the pool: stop accepting new work, wake every worker, and
    /// join their threads once they've drained whatever is already queued.
    pub fn close(&self) {
        if !self.control.mark_closed() {
            return;
        }
        self.control.wake_all();
        for worker in &self.workers {
            worker.shut_down();
        }
    }
}

impl Drop for FixedPoolBase {
    fn drop(&mut self) {
        self.close();
    }
}
