//! Idle-park helper used by workers waiting for new tasks.

use log::trace;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A mutex/condvar pair used purely for sleeping and waking, with no
/// protected data of its own — the waker doesn't need to know whether
/// anyone is parked, it just always notifies.
pub struct Parker {
    gate: Mutex<()>,
    cond: Condvar,
}

impl Parker {
    pub fn new() -> Self {
        Self {
            gate: Mutex::new(()),
            cond: Condvar::new(),
        }
    }

    /// Sleep until woken or `timeout` elapses, whichever comes first.
    pub fn park_timeout(&self, timeout: Duration) {
        trace!("parking for up to {timeout:?}");
        let guard = self.gate.lock().unwrap();
        let _ = self.cond.wait_timeout(guard, timeout).unwrap();
        trace!("resumed from park");
    }

    /// Wake anyone currently parked.
    pub fn wake(&self) {
        trace!("waking parked worker");
        let _guard = self.gate.lock().unwrap();
        self.cond.notify_all();
    }
}

impl Default for Parker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn park_timeout_returns_on_its_own() {
        let parker = Parker::new();
        let start = Instant::now();
        parker.park_timeout(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn wake_cuts_the_park_short() {
        let parker = Arc::new(Parker::new());
        let bg = Arc::clone(&parker);
        let start = Instant::now();
        let t = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            bg.wake();
        });
        parker.park_timeout(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1));
        t.join().unwrap();
    }
}
