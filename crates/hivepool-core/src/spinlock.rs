//! Spinlock guarding worker-local queues.
//!
//! This is a simple spinlock used internally by the Steady and Balance
//! worker-local queues, where the critical section is a single push or an
//! O(1) swap of two deques — short enough that a kernel-mediated mutex
//! would cost more than it saves.
//!
//! # Warning
//!
//! Do not hold this lock across a call into user code (a `Task::invoke`).
//! It is meant to guard queue bookkeeping only.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// A simple test-and-set spinlock with exponential backoff.
pub struct SpinLock<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
    /// Number of times `lock()` has completed a full acquire. Exposed only
    /// so tests can verify batch submission takes the lock exactly once.
    lock_count: AtomicU32,
}

// Safety: SpinLock provides exclusive access to T.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Create a new spinlock containing `value`.
    #[inline]
    pub const fn new(value: T) -> Self {
        SpinLock {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
            lock_count: AtomicU32::new(0),
        }
    }

    /// Acquire the lock, spinning with backoff until it is available.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                self.lock_count.fetch_add(1, Ordering::Relaxed);
                return SpinLockGuard { lock: self };
            }

            let mut spin_count = 0u32;
            while self.locked.load(Ordering::Relaxed) {
                spin_count = spin_count.wrapping_add(1);
                for _ in 0..spin_count.min(64) {
                    core::hint::spin_loop();
                }
            }
        }
    }

    /// Try to acquire the lock without spinning.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.lock_count.fetch_add(1, Ordering::Relaxed);
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Whether the lock is currently held, for diagnostics only.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Number of completed `lock()`/`try_lock()` acquisitions.
    ///
    /// Used by tests to confirm that `submit_in_batch` on an unbounded pool
    /// takes the destination spinlock exactly once per batch.
    #[inline]
    pub fn lock_count(&self) -> u32 {
        self.lock_count.load(Ordering::Relaxed)
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        SpinLock::new(T::default())
    }
}

/// RAII guard releasing the spinlock on drop.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<'a, T> Deref for SpinLockGuard<'a, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: holding the guard means we hold the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<'a, T> DerefMut for SpinLockGuard<'a, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // Safety: holding the guard means we hold the lock.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<'a, T> Drop for SpinLockGuard<'a, T> {
    #[inline]
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn basic_lock_unlock() {
        let lock = SpinLock::new(0u32);
        {
            let mut guard = lock.lock();
            *guard = 42;
        }
        assert_eq!(*lock.lock(), 42);
    }

    #[test]
    fn try_lock_fails_while_held() {
        let lock = SpinLock::new(0u32);
        let guard = lock.try_lock();
        assert!(guard.is_some());
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn lock_count_tracks_acquisitions() {
        let lock = SpinLock::new(0u32);
        assert_eq!(lock.lock_count(), 0);
        { let _g = lock.lock(); }
        { let _g = lock.lock(); }
        assert_eq!(lock.lock_count(), 2);
    }

    #[test]
    fn concurrent_increments_are_serialized() {
        let lock = Arc::new(SpinLock::new(0u32));
        let mut handles = vec![];
        for _ in 0..4 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    *lock.lock() += 1;
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.lock(), 4000);
    }
}
