//! Buffer pool module for Sockrelay
//!
//! This module provides the bounded pool of copy buffers shared by every
//! relay direction in the process. The pool is passed around explicitly as
//! an `Arc<BufferPool>`; there is no global instance.

mod buffer_pool;
mod guard;
mod stats;

pub use buffer_pool::BufferPool;
pub use guard::PooledBuffer;
pub use stats::{PoolStats, PoolStatsSnapshot};
