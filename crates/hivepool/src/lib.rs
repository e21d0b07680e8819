//! # hivepool
//!
//! Steady, Balance and Dynamic thread pools for high-throughput,
//! in-process task dispatch.
//!
//! - [`SteadyPool`] - fixed worker count, dual-queue workers tuned for
//!   sustained throughput over many small tasks.
//! - [`BalancePool`] - fixed worker count, single-queue workers tuned for
//!   even load distribution over fewer, larger tasks.
//! - [`DynamicPool`] - shared-queue pool whose worker count can be grown
//!   or shrunk at runtime.
//!
//! All three implement [`Submit`] for `submit`, `submit_for_return` and
//! `submit_in_batch`.

#![allow(dead_code)]

mod balance;
mod steady;

pub use balance::BalancePool;
pub use hivepool_core::{JoinHandle, PoolError, PoolResult};
pub use hivepool_runtime::{OverflowCallback, OverflowPolicy, PoolConfig};
pub use steady::SteadyPool;

mod dynamic_facade;
pub use dynamic_facade::DynamicPool;

use hivepool_core::{wrap_for_return, Task};

/// Common submission surface implemented by every pool variant.
pub trait Submit {
    /// Submit a fire-and-forget task.
    fn submit<F>(&self, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static;

    /// Submit a task and get back a handle to its eventual result.
    fn submit_for_return<F, T>(&self, f: F) -> PoolResult<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;

    /// Submit many tasks at once. On an unbounded pool this is a single
    /// lock acquisition; on a bounded pool tasks are admitted one at a
    /// time and the first refusal stops the batch, returning `Err` — tasks
    /// already admitted before the refusal still run.
    fn submit_in_batch<F>(&self, tasks: Vec<F>) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static;

    fn thread_count(&self) -> usize;
    fn tasks_loaded(&self) -> u64;
    fn tasks_submitted(&self) -> u64;
    fn is_closed(&self) -> bool;
    fn wait_for_tasks(&self);
    fn close(&self);
}

pub(crate) fn boxed_tasks<F>(tasks: Vec<F>) -> Vec<Task>
where
    F: FnOnce() + Send + 'static,
{
    tasks.into_iter().map(Task::new).collect()
}

pub(crate) fn submit_for_return_via<F, T>(
    f: F,
    admit: impl FnOnce(Task) -> PoolResult<()>,
) -> PoolResult<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (runner, handle) = wrap_for_return(f);
    admit(Task::new(runner))?;
    Ok(handle)
}
