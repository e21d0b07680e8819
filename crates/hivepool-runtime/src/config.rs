//! Pool configuration.

/// How a pool reacts when a worker-local queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// No capacity limit; admission never fails. Capacity units are tasks.
    Unbounded,
    /// Reject admission with `PoolError::AdmissionRefused` once the
    /// destination queue holds `capacity` tasks.
    BoundedThrow { capacity: usize },
    /// Block the producer until the destination queue has room.
    BoundedBlock { capacity: usize },
    /// Hand refused tasks to the configured overflow callback instead of
    /// queueing them.
    BoundedCallback { capacity: usize },
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        OverflowPolicy::Unbounded
    }
}

impl OverflowPolicy {
    /// The admission capacity, or `None` if unbounded.
    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        match self {
            OverflowPolicy::Unbounded => None,
            OverflowPolicy::BoundedThrow { capacity }
            | OverflowPolicy::BoundedBlock { capacity }
            | OverflowPolicy::BoundedCallback { capacity } => Some(*capacity),
        }
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        !matches!(self, OverflowPolicy::Unbounded)
    }
}

/// Configuration for a fixed-width (Steady/Balance) or Dynamic pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub num_workers: usize,
    /// Admission policy for worker-local queues.
    pub overflow_policy: OverflowPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let num_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            num_workers,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl PoolConfig {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread count.
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// Set the overflow policy.
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Validate this configuration, returning a descriptive error string.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1");
        }
        if let Some(capacity) = self.overflow_policy.capacity() {
            if capacity == 0 {
                return Err("a bounded overflow policy needs capacity >= 1; use OverflowPolicy::Unbounded for no limit");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded_with_available_parallelism_workers() {
        let cfg = PoolConfig::default();
        assert!(cfg.num_workers >= 1);
        assert_eq!(cfg.overflow_policy, OverflowPolicy::Unbounded);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_workers_is_invalid() {
        let cfg = PoolConfig::new().num_workers(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_capacity_bounded_policy_is_invalid() {
        let cfg = PoolConfig::new().overflow_policy(OverflowPolicy::BoundedThrow { capacity: 0 });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bounded_policy_reports_its_capacity() {
        let policy = OverflowPolicy::BoundedBlock { capacity: 10 };
        assert_eq!(policy.capacity(), Some(10));
        assert!(policy.is_bounded());
        assert_eq!(OverflowPolicy::Unbounded.capacity(), None);
    }
}
