//! # hivepool-runtime
//!
//! Worker threads, queues and pool-lifecycle logic shared by every
//! hivepool pool variant. The public facade (`hivepool` crate) is a thin
//! wrapper exposing `submit`/`submit_for_return`/`submit_in_batch` over
//! the types here.
//!
//! - `config` - `OverflowPolicy` and `PoolConfig`
//! - `control` - shared submitted/in-flight counters and the
//!   `wait_for_tasks` condvar
//! - `queue` - the spinlock-guarded queue used by Balance and Steady
//! - `park` - idle-park helper for worker threads
//! - `worker` - Balance/Steady worker threads and their drain loops
//! - `fixed` - shared load-balancer, admission and lifecycle logic for the
//!   fixed-width pool variants
//! - `dynamic` - the shared-queue pool whose worker count can change at
//!   runtime

#![allow(dead_code)]

pub mod config;
pub mod control;
pub mod dynamic;
pub mod fixed;
pub mod park;
pub mod queue;
pub mod worker;

pub use config::{OverflowPolicy, PoolConfig};
pub use dynamic::DynamicPool;
pub use fixed::{FixedPoolBase, OverflowCallback};
pub use worker::WorkerKind;
