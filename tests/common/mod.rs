//! Test utilities and mocks for Sockrelay
//!
//! This module provides common test utilities used across integration tests.

use sockrelay::config::ServerConfig;
use sockrelay::pool::BufferPool;
use sockrelay::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Spawn a TCP server that echoes every connection until the peer closes
pub async fn spawn_echo_server() -> SocketAddr {
    let (listener, addr) = create_test_listener().await;

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut r, mut w) = stream.split();
                let _ = tokio::io::copy(&mut r, &mut w).await;
            });
        }
    });

    addr
}

/// Address on loopback with nothing listening
pub async fn unused_local_addr() -> SocketAddr {
    let (listener, addr) = create_test_listener().await;
    drop(listener);
    addr
}

/// A relay server running in the background
pub struct TestServer {
    /// Address the server accepts on
    pub addr: SocketAddr,
    /// Buffer pool the server relays through
    pub pool: Arc<BufferPool>,
    shutdown_tx: broadcast::Sender<bool>,
}

impl TestServer {
    /// Bind an ephemeral port and start serving
    pub async fn start(config: ServerConfig) -> Self {
        let server = Server::new(config);
        let listener = server.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        let pool = Arc::clone(server.pool());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        tokio::spawn(async move { server.serve(listener, shutdown_rx).await });

        TestServer {
            addr,
            pool,
            shutdown_tx,
        }
    }

    /// Open a client connection to the server
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }

    /// Wait until every leased buffer is back in the pool
    pub async fn wait_buffers_returned(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.pool.stats().in_use_count != 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("buffers were not returned to the pool");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Test configuration builder
pub struct TestConfigBuilder {
    handshake_timeout: u64,
    idle_timeout: u64,
    buffer_size: usize,
    max_buffers: usize,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            handshake_timeout: 5,
            idle_timeout: 0,
            buffer_size: 1024,
            max_buffers: 4,
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set handshake timeout
    pub fn handshake_timeout(mut self, secs: u64) -> Self {
        self.handshake_timeout = secs;
        self
    }

    /// Set relay idle timeout
    pub fn idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout = secs;
        self
    }

    /// Set pool buffer size
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set pool bound
    pub fn max_buffers(mut self, max: usize) -> Self {
        self.max_buffers = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ServerConfig {
        let mut config = ServerConfig {
            listen_addr: "127.0.0.1".to_string(),
            listen_port: 0,
            ..Default::default()
        };
        config.socks.handshake_timeout = self.handshake_timeout;
        config.socks.connect_timeout = 5;
        config.socks.idle_timeout = self.idle_timeout;
        config.pool.buffer_size = self.buffer_size;
        config.pool.max_buffers = self.max_buffers;
        config
    }
}

/// Mock SOCKS5 handshake data
pub mod socks5_mock {
    use super::*;
    use sockrelay::socks::*;

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a connect command to an IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        encode_connect_request(&Endpoint::ipv4(ip.into(), port)).unwrap()
    }

    /// Create a connect command to a domain
    pub fn create_connect_domain(domain: &str, port: u16) -> Vec<u8> {
        encode_connect_request(&Endpoint::domain(domain, port)).unwrap()
    }

    /// Negotiate no-auth and send `request`, returning the connect reply
    pub async fn handshake(stream: &mut TcpStream, request: &[u8]) -> [u8; CONNECT_REPLY_LEN] {
        stream.write_all(&create_auth_request_no_auth()).await.unwrap();
        let mut method = [0u8; 2];
        stream.read_exact(&mut method).await.unwrap();
        assert_eq!(method, [SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE]);

        stream.write_all(request).await.unwrap();
        let mut reply = [0u8; CONNECT_REPLY_LEN];
        stream.read_exact(&mut reply).await.unwrap();
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_server() {
        let addr = spawn_echo_server().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn test_config_builder() {
        let config = TestConfigBuilder::new()
            .handshake_timeout(2)
            .idle_timeout(3)
            .buffer_size(16)
            .max_buffers(1)
            .build();

        assert_eq!(config.listen_port, 0);
        assert_eq!(config.socks.handshake_timeout, 2);
        assert_eq!(config.socks.idle_timeout, 3);
        assert_eq!(config.pool.buffer_size, 16);
        assert_eq!(config.pool.max_buffers, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socks5_mock_connect_ipv4() {
        let cmd = socks5_mock::create_connect_ipv4([127, 0, 0, 1], 9045);
        assert_eq!(cmd, vec![5, 1, 0, 1, 127, 0, 0, 1, 0x23, 0x55]);
    }

    #[test]
    fn test_socks5_mock_connect_domain() {
        let cmd = socks5_mock::create_connect_domain("example.invalid", 80);
        assert_eq!(cmd[3], 3); // Domain
        assert_eq!(cmd[4] as usize, "example.invalid".len());
        assert_eq!(&cmd[cmd.len() - 2..], &[0, 80]);
    }
}
