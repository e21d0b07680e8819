//! Type-erased, move-only unit of work.

/// A move-only, type-erased zero-argument callable.
///
/// `Task` is the only thing that ever moves between a producer and a
/// worker. It owns exactly one heap record (the boxed closure) from
/// construction until `invoke` consumes it. A `Task` cannot be cloned and
/// cannot be invoked more than once, because `invoke` takes `self` by
/// value.
pub struct Task {
    inner: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Task {
    /// Wrap `f` in a new `Task`. Allocates exactly one heap record.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            inner: Some(Box::new(f)),
        }
    }

    /// Whether this `Task` currently holds a callable.
    ///
    /// A default-constructed `Task` returns `false` here and is not
    /// invocable; workers never build one of these to run, so the only
    /// way to observe `is_set() == false` is by constructing one directly.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.inner.is_some()
    }

    /// Replace the callable this `Task` wraps.
    pub fn reset<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner = Some(Box::new(f));
    }

    /// Invoke and consume the callable.
    ///
    /// Calling this on an unset `Task` is a no-op: there is nothing to run
    /// and nothing to report, since an unset `Task` is never handed to a
    /// worker by any code in this crate family.
    pub fn invoke(self) {
        if let Some(f) = self.inner {
            f();
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Task { inner: None }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("is_set", &self.is_set()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn default_task_is_not_set() {
        let task = Task::default();
        assert!(!task.is_set());
    }

    #[test]
    fn new_task_is_set() {
        let task = Task::new(|| {});
        assert!(task.is_set());
    }

    #[test]
    fn invoke_runs_exactly_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let task = Task::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        task.invoke();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invoke_on_unset_task_is_a_noop() {
        let task = Task::default();
        task.invoke(); // must not panic
    }

    #[test]
    fn reset_replaces_the_callable() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut task = Task::default();
        assert!(!task.is_set());

        let c = Arc::clone(&count);
        task.reset(move || {
            c.fetch_add(5, Ordering::SeqCst);
        });
        assert!(task.is_set());
        task.invoke();
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn task_can_move_between_threads() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let task = Task::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let handle = std::thread::spawn(move || {
            task.invoke();
        });
        handle.join().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
