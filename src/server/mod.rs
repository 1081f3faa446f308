//! Server module for Sockrelay
//!
//! This module contains the TCP listener that accepts SOCKS5 clients and
//! hands each of them to the connection handler.

#[allow(clippy::module_inception)]
mod server;

pub use server::Server;

use crate::config::Config;
use crate::error::SockrelayError;
use anyhow::{Context, Result};
use tokio::sync::broadcast;

/// Run the server with the given configuration
pub async fn run_server(config: Config, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    config
        .server
        .validate()
        .map_err(SockrelayError::Config)
        .context("Invalid server configuration")?;

    Server::new(config.server).run(shutdown_rx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_server_rejects_invalid_config() {
        let mut config = Config::default();
        config.server.pool.buffer_size = 0;
        let (_tx, rx) = broadcast::channel(1);

        let err = run_server(config, rx).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid server configuration"));
    }
}
