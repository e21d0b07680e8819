//! Pool-wide bookkeeping shared by every pool variant: submitted/in-flight
//! task counters, the closed flag, and the condvar used by
//! `wait_for_tasks` and bounded-block admission.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

pub struct PoolControlBlock {
    total_tasks: AtomicU64,
    total_completed: AtomicU64,
    task_loaded: AtomicU64,
    closed: AtomicBool,
    waiters: AtomicUsize,
    gate: Mutex<()>,
    cond: Condvar,
}

impl PoolControlBlock {
    pub fn new() -> Self {
        Self {
            total_tasks: AtomicU64::new(0),
            total_completed: AtomicU64::new(0),
            task_loaded: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            waiters: AtomicUsize::new(0),
            gate: Mutex::new(()),
            cond: Condvar::new(),
        }
    }

    /// Record `n` newly admitted tasks.
    pub fn record_submitted(&self, n: u64) {
        self.total_tasks.fetch_add(n, Ordering::Relaxed);
        self.task_loaded.fetch_add(n, Ordering::Relaxed);
    }

    /// Record `n` tasks finishing execution (successfully or not).
    pub fn record_completed(&self, n: u64) {
        self.task_loaded.fetch_sub(n, Ordering::AcqRel);
        self.total_completed.fetch_add(n, Ordering::Relaxed);
        self.wake_waiters();
    }

    /// Total tasks ever admitted into this pool.
    pub fn total_tasks(&self) -> u64 {
        self.total_tasks.load(Ordering::Relaxed)
    }

    /// Total tasks that have finished executing.
    pub fn total_completed(&self) -> u64 {
        self.total_completed.load(Ordering::Relaxed)
    }

    /// Tasks admitted but not yet finished executing.
    pub fn task_loaded(&self) -> u64 {
        self.task_loaded.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the pool closed. Returns `true` if this call is the one that
    /// transitioned it (i.e. it was not already closed).
    pub fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// Block the caller until `task_loaded` reaches zero.
    pub fn wait_for_tasks(&self) {
        self.wait_until(|| self.task_loaded.load(Ordering::Acquire) == 0);
    }

    /// Block the caller until `predicate` holds, rechecking it every time a
    /// task completes. Used by `OverflowPolicy::BoundedBlock` admission to
    /// wait for queue space to free up.
    pub fn wait_until(&self, predicate: impl Fn() -> bool) {
        if predicate() {
            return;
        }
        self.waiters.fetch_add(1, Ordering::AcqRel);
        let mut guard = self.gate.lock().unwrap();
        while !predicate() {
            guard = self.cond.wait(guard).unwrap();
        }
        drop(guard);
        self.waiters.fetch_sub(1, Ordering::AcqRel);
    }

    fn wake_waiters(&self) {
        if self.waiters.load(Ordering::Acquire) > 0 {
            let _guard = self.gate.lock().unwrap();
            self.cond.notify_all();
        }
    }

    /// Wake anyone blocked in `wait_until`/`wait_for_tasks` regardless of
    /// counters, used when the pool is closing so blocked producers don't
    /// wait forever on space that will never free.
    pub fn wake_all(&self) {
        let _guard = self.gate.lock().unwrap();
        self.cond.notify_all();
    }
}

impl Default for PoolControlBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn wait_for_tasks_returns_immediately_when_empty() {
        let control = PoolControlBlock::new();
        control.wait_for_tasks();
    }

    #[test]
    fn wait_for_tasks_blocks_until_completion() {
        let control = Arc::new(PoolControlBlock::new());
        control.record_submitted(1);
        let bg = Arc::clone(&control);
        let t = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            bg.record_completed(1);
        });
        control.wait_for_tasks();
        assert_eq!(control.task_loaded(), 0);
        t.join().unwrap();
    }

    #[test]
    fn mark_closed_is_one_shot() {
        let control = PoolControlBlock::new();
        assert!(control.mark_closed());
        assert!(!control.mark_closed());
        assert!(control.is_closed());
    }

    #[test]
    fn wait_until_rechecks_predicate_on_every_completion() {
        let control = Arc::new(PoolControlBlock::new());
        control.record_submitted(3);
        let bg = Arc::clone(&control);
        let t = std::thread::spawn(move || {
            for _ in 0..3 {
                std::thread::sleep(Duration::from_millis(10));
                bg.record_completed(1);
            }
        });
        control.wait_until(|| control.task_loaded() <= 1);
        assert!(control.task_loaded() <= 1);
        t.join().unwrap();
    }
}
