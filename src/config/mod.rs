//! Configuration module for Sockrelay
//!
//! This module provides configuration types and parsing for the server.

mod pool;
mod server;
mod transport;

pub use pool::BufferPoolConfig;
pub use server::{Config, ServerConfig, SocksConfig};
pub use transport::TcpConfig;

use crate::error::SockrelayError;
use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).with_context(|| "Failed to parse configuration")?;
    config.server.validate().map_err(SockrelayError::Config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1");
        assert_eq!(config.server.listen_port, 8999);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config_str = r#"
[server]
listen_addr = "0.0.0.0"
listen_port = 1080
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0");
        assert_eq!(config.server.listen_port, 1080);
        assert!(config.server.debug);
    }

    #[test]
    fn test_parse_debug_disabled() {
        let config = parse_config("[server]\ndebug = false\n").unwrap();
        assert!(!config.server.debug);
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[server]
listen_addr = "::1"
listen_port = 1081
debug = true

[server.socks]
handshake_timeout = 5
connect_timeout = 3
idle_timeout = 120

[server.tcp]
nodelay = false
keepalive_secs = 30
keepalive_interval = 10

[server.pool]
buffer_size = 16384
max_buffers = 64
"#;

        let config = parse_config(config_str).unwrap();
        assert!(config.server.debug);
        assert_eq!(config.server.socks.handshake_timeout, 5);
        assert_eq!(config.server.socks.idle_timeout, 120);
        assert!(!config.server.tcp.nodelay);
        assert_eq!(config.server.pool.buffer_size, 16384);
        assert_eq!(config.server.pool.max_buffers, 64);
    }

    #[test]
    fn test_parse_invalid_pool_config() {
        let config_str = r#"
[server.pool]
buffer_size = 0
"#;
        let err = parse_config(config_str).unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn test_parse_malformed_toml() {
        assert!(parse_config("[server\nlisten_port = ").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten_port = 2080").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.listen_port, 2080);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/sockrelay.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
