//! The worker-local queue used by both the Balance (single-queue) and
//! Steady (dual-queue) pool variants.
//!
//! Admission (the producer side) is identical for both variants: a
//! spinlock-guarded `VecDeque`. They differ only in how the *consuming*
//! worker drains it — see `worker.rs`.

use hivepool_core::SpinLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Producer-facing operations on a worker-local queue.
pub trait AdmissionQueue: Send + Sync + 'static {
    fn new() -> Self;
    /// Approximate length, used by the load balancer. May be stale by the
    /// time the caller acts on it.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Push one task, refusing it if `capacity` is `Some(c)` and the queue
    /// already holds `c` tasks. On refusal, the task is handed back.
    fn try_push(&self, task: hivepool_core::Task, capacity: Option<usize>) -> Result<(), hivepool_core::Task>;
    /// Push a whole batch under a single lock acquisition. Only valid when
    /// the caller has already established there is no capacity limit, or
    /// has otherwise pre-admitted the batch.
    fn push_batch_unlimited(&self, tasks: Vec<hivepool_core::Task>);
}

/// Spinlock-guarded `VecDeque<Task>`, with an `AtomicUsize` length kept in
/// lockstep so the load balancer can read queue depth without contending
/// with a worker's push/pop/swap under the spinlock.
pub struct SpinQueue {
    inner: SpinLock<VecDeque<hivepool_core::Task>>,
    len: AtomicUsize,
}

impl AdmissionQueue for SpinQueue {
    fn new() -> Self {
        Self {
            inner: SpinLock::new(VecDeque::new()),
            len: AtomicUsize::new(0),
        }
    }

    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    fn try_push(&self, task: hivepool_core::Task, capacity: Option<usize>) -> Result<(), hivepool_core::Task> {
        let mut guard = self.inner.lock();
        if let Some(cap) = capacity {
            if guard.len() >= cap {
                return Err(task);
            }
        }
        guard.push_back(task);
        self.len.store(guard.len(), Ordering::Release);
        Ok(())
    }

    fn push_batch_unlimited(&self, tasks: Vec<hivepool_core::Task>) {
        let mut guard = self.inner.lock();
        guard.extend(tasks);
        self.len.store(guard.len(), Ordering::Release);
    }
}

impl SpinQueue {
    /// Pop the next task for a worker to execute.
    pub fn pop(&self) -> Option<hivepool_core::Task> {
        let mut guard = self.inner.lock();
        let task = guard.pop_front();
        self.len.store(guard.len(), Ordering::Release);
        task
    }

    /// Swap the entire contents with `buffer`, used by the Steady worker
    /// to move tasks into its thread-owned drain buffer under a single
    /// lock acquisition.
    pub fn swap_out(&self, buffer: &mut VecDeque<hivepool_core::Task>) {
        let mut guard = self.inner.lock();
        std::mem::swap(&mut *guard, buffer);
        self.len.store(guard.len(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hivepool_core::Task;

    #[test]
    fn push_then_pop_is_fifo() {
        let q = SpinQueue::new();
        q.try_push(Task::new(|| {}), None).unwrap();
        q.try_push(Task::new(|| {}), None).unwrap();
        assert_eq!(q.len(), 2);
        assert!(q.pop().is_some());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn capacity_refuses_overflow() {
        let q = SpinQueue::new();
        q.try_push(Task::new(|| {}), Some(1)).unwrap();
        let refused = q.try_push(Task::new(|| {}), Some(1));
        assert!(refused.is_err());
    }

    #[test]
    fn swap_out_moves_everything_at_once() {
        let q = SpinQueue::new();
        q.try_push(Task::new(|| {}), None).unwrap();
        q.try_push(Task::new(|| {}), None).unwrap();
        let mut buffer = VecDeque::new();
        q.swap_out(&mut buffer);
        assert_eq!(buffer.len(), 2);
        assert_eq!(q.len(), 0);
    }
}
