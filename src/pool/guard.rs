//! RAII guard for pooled buffers
//!
//! Provides automatic return of buffers to the pool when dropped.

use super::BufferPool;
use bytes::BytesMut;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// RAII guard that returns the buffer to the pool on drop
///
/// The guard is the only owner of its buffer, so a buffer can never be
/// leased twice, and `Drop` hands it back exactly once on every exit path
/// of the owning copy loop, including errors and unwinding.
pub struct PooledBuffer {
    /// The buffer (Option so `Drop` can move it out)
    buf: Option<BytesMut>,
    /// Pool the buffer came from
    pool: Arc<BufferPool>,
}

impl PooledBuffer {
    pub(super) fn new(buf: BytesMut, pool: Arc<BufferPool>) -> Self {
        PooledBuffer {
            buf: Some(buf),
            pool,
        }
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.buf.as_deref().unwrap_or_default()
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_deref_mut().unwrap_or_default()
    }
}

impl fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.len())
            .finish()
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.release(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_drop_returns_to_pool() {
        let pool = BufferPool::new(2, 16);

        {
            let _guard = pool.lease();
            assert_eq!(pool.stats().in_use_count, 1);
            // Guard dropped here
        }

        let stats = pool.stats();
        assert_eq!(stats.in_use_count, 0);
        assert_eq!(stats.total_returned, 1);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_guard_deref() {
        let pool = BufferPool::new(1, 8);
        let guard = pool.lease();

        assert_eq!(guard.len(), 8);
        assert!(guard.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_guard_deref_mut() {
        let pool = BufferPool::new(1, 4);
        let mut guard = pool.lease();

        guard[..3].copy_from_slice(b"abc");
        assert_eq!(&guard[..3], b"abc");
    }

    #[test]
    fn test_guard_debug() {
        let pool = BufferPool::new(1, 4);
        let guard = pool.lease();
        assert!(format!("{:?}", guard).contains("PooledBuffer"));
    }
}
