//! Worker identifier type.

use core::fmt;

/// Identifier for a worker within a pool.
///
/// This is a small index type rather than a raw `usize` so load-balancer
/// and worker-state APIs read clearly at call sites.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct WorkerId(u32);

impl WorkerId {
    /// Create a worker id from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        WorkerId(index)
    }

    /// Raw index, for use in `Vec` indexing.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for WorkerId {
    #[inline]
    fn from(index: usize) -> Self {
        WorkerId(index as u32)
    }
}

impl fmt::Debug for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerId({})", self.0)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_usize() {
        let id: WorkerId = 3usize.into();
        assert_eq!(id.as_usize(), 3);
    }

    #[test]
    fn display_is_the_bare_index() {
        assert_eq!(format!("{}", WorkerId::new(7)), "7");
    }
}
