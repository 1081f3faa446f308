//! Buffer pool configuration
//!
//! Defines configuration for the relay copy buffer pool.

use serde::{Deserialize, Serialize};

/// Default size of each copy buffer
fn default_buffer_size() -> usize {
    32 * 1024
}

/// Default number of idle buffers retained (5 MiB at the default size)
fn default_max_buffers() -> usize {
    160
}

/// Copy buffer pool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BufferPoolConfig {
    /// Size in bytes of every pooled buffer
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Maximum number of idle buffers kept for reuse
    #[serde(default = "default_max_buffers")]
    pub max_buffers: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        BufferPoolConfig {
            buffer_size: default_buffer_size(),
            max_buffers: default_max_buffers(),
        }
    }
}

impl BufferPoolConfig {
    /// Validate the pool configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.buffer_size == 0 {
            return Err("buffer_size must be greater than 0".to_string());
        }
        if self.max_buffers == 0 {
            return Err("max_buffers must be greater than 0".to_string());
        }
        Ok(())
    }
}
