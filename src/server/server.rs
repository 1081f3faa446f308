//! Main server structure
//!
//! Owns the listener loop and spawns one task per accepted connection.

use crate::config::ServerConfig;
use crate::error::SockrelayError;
use crate::helper::ACCEPT_ERROR_BACKOFF;
use crate::pool::BufferPool;
use crate::socks::handle_connection;
use crate::transport::{Dialer, SocketOpts, TcpDialer};
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// SOCKS5 relay server
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// Copy buffers shared by every session
    pool: Arc<BufferPool>,
    /// Outbound connector
    dialer: Arc<dyn Dialer>,
    /// Options applied to accepted client sockets
    socket_opts: SocketOpts,
}

impl Server {
    /// Create a server with a TCP dialer built from the configuration
    pub fn new(config: ServerConfig) -> Self {
        let dialer = Arc::new(TcpDialer::from_config(&config));
        Self::with_dialer(config, dialer)
    }

    /// Create a server with a custom dialer
    pub fn with_dialer(config: ServerConfig, dialer: Arc<dyn Dialer>) -> Self {
        let pool = BufferPool::from_config(&config.pool);
        let socket_opts = SocketOpts::from_tcp_config(&config.tcp);
        Server {
            config: Arc::new(config),
            pool,
            dialer,
            socket_opts,
        }
    }

    /// Bind the configured listen address
    pub async fn bind(&self) -> Result<TcpListener, SockrelayError> {
        let addr = self.config.listen_display();
        TcpListener::bind(addr.as_str())
            .await
            .map_err(|source| SockrelayError::Listen { addr, source })
    }

    /// Accept connections until shutdown
    ///
    /// Sessions already running are left to finish on their own.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<bool>,
    ) -> Result<()> {
        match listener.local_addr() {
            Ok(addr) => info!("SOCKS5 server listening on {}", addr),
            Err(_) => info!("SOCKS5 server listening on {}", self.config.listen_display()),
        }

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Accepted connection from {}", peer);
                        self.socket_opts.hint(&stream);
                        self.spawn_session(stream, peer);
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping listener");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Bind and serve until shutdown
    pub async fn run(self, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_rx).await
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr) {
        let config = Arc::clone(&self.config);
        let pool = Arc::clone(&self.pool);
        let dialer = Arc::clone(&self.dialer);

        tokio::spawn(async move {
            match handle_connection(stream, &config.socks, dialer.as_ref(), pool).await {
                Ok(report) => debug!(
                    "Connection from {} closed: client->dest {}, dest->client {}",
                    peer, report.client_to_dest, report.dest_to_client
                ),
                Err(e) if e.is_protocol_violation() => {
                    warn!("SOCKS5 protocol error from {}: {}", peer, e)
                }
                Err(e) => debug!("Connection from {} ended: {}", peer, e),
            }
        });
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the buffer pool
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> ServerConfig {
        ServerConfig {
            listen_addr: "127.0.0.1".to_string(),
            listen_port: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_server_uses_pool_config() {
        let mut config = create_test_config();
        config.pool.max_buffers = 3;
        config.pool.buffer_size = 512;

        let server = Server::new(config);
        assert_eq!(server.pool().max_buffers(), 3);
        assert_eq!(server.pool().buffer_size(), 512);
        assert_eq!(server.config().listen_port, 0);
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = Server::new(create_test_config());
        let listener = server.bind().await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_failure_is_listen_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = create_test_config();
        config.listen_port = taken.local_addr().unwrap().port();

        let err = Server::new(config).bind().await.unwrap_err();
        assert!(matches!(err, SockrelayError::Listen { .. }));
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let server = Server::new(create_test_config());
        let listener = server.bind().await.unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move { server.serve(listener, shutdown_rx).await });
        shutdown_tx.send(true).unwrap();

        handle.await.unwrap().unwrap();
    }
}
