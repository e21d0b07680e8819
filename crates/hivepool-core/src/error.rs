//! Error types surfaced by pool operations.

use core::fmt;

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur when submitting to, or mutating the lifecycle of,
/// a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A bounded pool under `BoundedThrow` refused a task because the
    /// destination queue was already at `capacity`.
    AdmissionRefused {
        /// The capacity that was exceeded.
        capacity: usize,
    },

    /// Submission or lifecycle mutation was attempted after `close`.
    PoolClosed,

    /// A lifecycle API was called with a configuration or argument that
    /// can never be satisfied (carries a human-readable reason).
    InvalidLifecycle(&'static str),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::AdmissionRefused { capacity } => {
                write!(f, "admission refused: queue at capacity ({capacity})")
            }
            PoolError::PoolClosed => write!(f, "pool is closed"),
            PoolError::InvalidLifecycle(reason) => write!(f, "invalid lifecycle operation: {reason}"),
        }
    }
}

impl std::error::Error for PoolError {}
