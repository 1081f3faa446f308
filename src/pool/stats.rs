//! Buffer pool statistics
//!
//! Lock-free counters describing buffer churn in the pool.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Statistics for the buffer pool
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Buffers freshly allocated because the pool was empty
    pub total_allocated: AtomicUsize,
    /// Buffers handed out
    pub total_leased: AtomicUsize,
    /// Buffers handed back
    pub total_returned: AtomicUsize,
    /// Returned buffers dropped because the pool was full
    pub total_discarded: AtomicUsize,
    /// Buffers currently leased
    pub in_use_count: AtomicUsize,
}

impl PoolStats {
    /// Create new pool stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh allocation
    pub fn record_allocated(&self) {
        self.total_allocated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lease
    pub fn record_leased(&self) {
        self.total_leased.fetch_add(1, Ordering::Relaxed);
        self.in_use_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a return
    pub fn record_returned(&self) {
        self.total_returned.fetch_add(1, Ordering::Relaxed);
        self.in_use_count.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a buffer dropped on return
    pub fn record_discarded(&self) {
        self.total_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current stats snapshot
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            total_allocated: self.total_allocated.load(Ordering::Relaxed),
            total_leased: self.total_leased.load(Ordering::Relaxed),
            total_returned: self.total_returned.load(Ordering::Relaxed),
            total_discarded: self.total_discarded.load(Ordering::Relaxed),
            in_use_count: self.in_use_count.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct PoolStatsSnapshot {
    pub total_allocated: usize,
    pub total_leased: usize,
    pub total_returned: usize,
    pub total_discarded: usize,
    pub in_use_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let stats = PoolStats::new();
        let snap = stats.snapshot();
        assert_eq!(snap.total_allocated, 0);
        assert_eq!(snap.total_leased, 0);
        assert_eq!(snap.in_use_count, 0);
    }

    #[test]
    fn test_stats_lease_and_return() {
        let stats = PoolStats::new();
        stats.record_allocated();
        stats.record_leased();
        stats.record_leased();
        stats.record_returned();
        stats.record_discarded();

        let snap = stats.snapshot();
        assert_eq!(snap.total_allocated, 1);
        assert_eq!(snap.total_leased, 2);
        assert_eq!(snap.total_returned, 1);
        assert_eq!(snap.total_discarded, 1);
        assert_eq!(snap.in_use_count, 1);
    }
}
