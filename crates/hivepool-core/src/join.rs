//! Single-task promise/future-like handle returned by `submit_for_return`.
//!
//! This is deliberately tiny: a single slot, written once by the task
//! wrapper and read once by the caller. Gathering many of these into one
//! future is the job of an external aggregation container, out of scope
//! for this crate (see SPEC_FULL.md §1).

use std::sync::{Arc, Condvar, Mutex};

struct Shared<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

/// A handle to the eventual result of a task submitted via
/// `submit_for_return`.
pub struct JoinHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> JoinHandle<T> {
    /// Block until the result is available and return it.
    pub fn get(self) -> T {
        let mut guard = self.shared.slot.lock().unwrap();
        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            guard = self.shared.ready.wait(guard).unwrap();
        }
    }

    /// Return the result if it is already available, without blocking.
    pub fn try_get(&self) -> Option<T> {
        self.shared.slot.lock().unwrap().take()
    }

    /// Whether the result has been produced but not yet collected.
    pub fn is_ready(&self) -> bool {
        self.shared.slot.lock().unwrap().is_some()
    }
}

/// The writing half, held by the task wrapper built inside `submit_for_return`.
pub(crate) struct ResultSink<T> {
    shared: Arc<Shared<T>>,
}

impl<T> ResultSink<T> {
    /// Store `value` and wake anyone blocked in `JoinHandle::get`.
    pub(crate) fn fulfill(self, value: T) {
        *self.shared.slot.lock().unwrap() = Some(value);
        self.shared.ready.notify_all();
    }
}

/// Create a linked `(ResultSink, JoinHandle)` pair.
pub(crate) fn pair<T>() -> (ResultSink<T>, JoinHandle<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        ready: Condvar::new(),
    });
    (
        ResultSink { shared: Arc::clone(&shared) },
        JoinHandle { shared },
    )
}

/// Wrap `f` so that its return value is deposited into a freshly created
/// `JoinHandle`, returning the handle alongside a zero-argument closure
/// suitable for boxing into a `Task`.
pub fn wrap_for_return<F, T>(f: F) -> (impl FnOnce() + Send + 'static, JoinHandle<T>)
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (sink, handle) = pair();
    let runner = move || {
        let value = f();
        sink.fulfill(value);
    };
    (runner, handle)
}
