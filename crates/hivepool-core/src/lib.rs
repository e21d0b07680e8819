//! # hivepool-core
//!
//! Platform-agnostic building blocks shared by every hivepool pool variant.
//!
//! This crate contains no worker-loop or pool-lifecycle logic; it only
//! provides the primitives that `hivepool-runtime` assembles into workers
//! and pools.
//!
//! ## Modules
//!
//! - `task` - the type-erased, move-only unit of work
//! - `spinlock` - internal spinlock primitive for worker-local queues
//! - `join` - single-task promise/future-like handle for `submit_for_return`
//! - `error` - error types surfaced by pool operations
//! - `id` - worker identifier type
//! - `env` - environment variable tuning helpers

#![allow(dead_code)]

pub mod env;
pub mod error;
pub mod id;
pub mod join;
pub mod spinlock;
pub mod task;

pub use error::{PoolError, PoolResult};
pub use id::WorkerId;
pub use join::{wrap_for_return, JoinHandle};
pub use spinlock::{SpinLock, SpinLockGuard};
pub use task::Task;
