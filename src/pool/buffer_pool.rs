//! Bounded pool of fixed-size copy buffers
//!
//! Relay directions lease one buffer each for the lifetime of their copy
//! loop. An empty pool allocates a fresh buffer rather than blocking, and a
//! full pool drops returned buffers, so the pool bounds retained memory
//! without ever stalling a relay.

use super::guard::PooledBuffer;
use super::stats::{PoolStats, PoolStatsSnapshot};
use crate::config::BufferPoolConfig;
use bytes::BytesMut;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// Thread-safe pool of equally sized byte buffers
#[derive(Debug)]
pub struct BufferPool {
    /// Idle buffers ready to be leased
    buffers: Mutex<Vec<BytesMut>>,
    /// Length of every buffer handed out
    buffer_size: usize,
    /// Maximum number of idle buffers retained
    max_buffers: usize,
    /// Lease/return counters
    stats: PoolStats,
}

impl BufferPool {
    /// Create a pool retaining at most `max_buffers` buffers of `buffer_size` bytes
    pub fn new(max_buffers: usize, buffer_size: usize) -> Arc<Self> {
        Arc::new(BufferPool {
            buffers: Mutex::new(Vec::with_capacity(max_buffers)),
            buffer_size,
            max_buffers,
            stats: PoolStats::new(),
        })
    }

    /// Create a pool from configuration
    pub fn from_config(config: &BufferPoolConfig) -> Arc<Self> {
        Self::new(config.max_buffers, config.buffer_size)
    }

    /// Lease a buffer; it goes back to the pool when the guard is dropped
    pub fn lease(self: &Arc<Self>) -> PooledBuffer {
        let reused = self.idle().pop();
        let buf = match reused {
            Some(buf) => buf,
            None => {
                self.stats.record_allocated();
                BytesMut::zeroed(self.buffer_size)
            }
        };
        self.stats.record_leased();
        PooledBuffer::new(buf, Arc::clone(self))
    }

    /// Take a buffer back from a dropped guard
    pub(super) fn release(&self, buf: BytesMut) {
        self.stats.record_returned();

        if buf.len() != self.buffer_size {
            self.stats.record_discarded();
            return;
        }

        let mut idle = self.idle();
        if idle.len() < self.max_buffers {
            idle.push(buf);
        } else {
            drop(idle);
            self.stats.record_discarded();
            trace!("Buffer pool full, discarding returned buffer");
        }
    }

    /// Number of idle buffers currently held
    pub fn available(&self) -> usize {
        self.idle().len()
    }

    /// Size of each buffer
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Maximum number of idle buffers retained
    pub fn max_buffers(&self) -> usize {
        self.max_buffers
    }

    /// Get current stats snapshot
    pub fn stats(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }

    // A panic while holding the lock cannot leave the Vec half-updated,
    // so a poisoned lock is still safe to use.
    fn idle(&self) -> MutexGuard<'_, Vec<BytesMut>> {
        self.buffers.lock().unwrap_or_else(|e| e.into_inner())
    }
}
