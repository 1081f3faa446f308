//! Server configuration types
//!
//! Defines the main configuration structures for the relay server.

use super::{BufferPoolConfig, TcpConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default listen address
fn default_listen_addr() -> String {
    "127.0.0.1".to_string()
}

/// Default listen port
fn default_listen_port() -> u16 {
    8999
}

/// Per-connection debug logs are on unless turned off
fn default_debug() -> bool {
    true
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Listener and per-connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1" or "::1")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port to listen on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Emit per-connection debug logs
    #[serde(default = "default_debug")]
    pub debug: bool,

    /// SOCKS5 handshake and relay settings
    #[serde(default)]
    pub socks: SocksConfig,

    /// Socket options for accepted and dialed streams
    #[serde(default)]
    pub tcp: TcpConfig,

    /// Copy buffer pool settings
    #[serde(default)]
    pub pool: BufferPoolConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            debug: default_debug(),
            socks: SocksConfig::default(),
            tcp: TcpConfig::default(),
            pool: BufferPoolConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` form of the listen address, for logging
    pub fn listen_display(&self) -> String {
        if self.listen_addr.contains(':') {
            format!("[{}]:{}", self.listen_addr, self.listen_port)
        } else {
            format!("{}:{}", self.listen_addr, self.listen_port)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.trim().is_empty() {
            return Err("listen_addr cannot be empty".to_string());
        }
        self.pool.validate()
    }
}

/// Default handshake timeout in seconds
fn default_handshake_timeout() -> u64 {
    10
}

/// Default connect timeout in seconds
fn default_connect_timeout() -> u64 {
    10
}

/// SOCKS5 deadlines, in seconds; 0 disables a deadline
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SocksConfig {
    /// Deadline for the negotiation up to the request, and again for the reply
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout: u64,

    /// Deadline for the outbound TCP connect
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// How long a relay session may move no bytes in either direction
    #[serde(default)]
    pub idle_timeout: u64,
}

impl Default for SocksConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: default_handshake_timeout(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: 0,
        }
    }
}

impl SocksConfig {
    /// Handshake deadline, if enabled
    pub fn handshake_deadline(&self) -> Option<Duration> {
        secs_to_deadline(self.handshake_timeout)
    }

    /// Connect deadline, if enabled
    pub fn connect_deadline(&self) -> Option<Duration> {
        secs_to_deadline(self.connect_timeout)
    }

    /// Relay idle deadline, if enabled
    pub fn idle_deadline(&self) -> Option<Duration> {
        secs_to_deadline(self.idle_timeout)
    }
}

fn secs_to_deadline(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
