//! TCP dialer
//!
//! Resolves CONNECT endpoints and opens plain TCP connections to them.

use super::{Dialer, SocketOpts};
use crate::config::ServerConfig;
use crate::error::DialError;
use crate::socks::Endpoint;
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Dialer for plain TCP destinations
#[derive(Debug, Clone)]
pub struct TcpDialer {
    /// Socket options to apply to connections
    socket_opts: SocketOpts,
    /// Per-address connection timeout
    connect_timeout: Option<Duration>,
}

impl TcpDialer {
    /// Create a new TCP dialer with default options
    pub fn with_defaults() -> Self {
        TcpDialer {
            socket_opts: SocketOpts::default(),
            connect_timeout: Some(Duration::from_secs(
                crate::helper::DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
        }
    }

    /// Create a dialer from server configuration
    pub fn from_config(config: &ServerConfig) -> Self {
        TcpDialer {
            socket_opts: SocketOpts::from_tcp_config(&config.tcp),
            connect_timeout: config.socks.connect_deadline(),
        }
    }

    async fn lookup(&self, endpoint: &Endpoint) -> Result<Vec<SocketAddr>, DialError> {
        match endpoint {
            Endpoint::Ip(addr) => Ok(vec![*addr]),
            Endpoint::Domain(domain, port) => {
                let lookup = tokio::net::lookup_host((domain.as_str(), *port));
                let result = match self.connect_timeout {
                    Some(timeout) => tokio::time::timeout(timeout, lookup)
                        .await
                        .unwrap_or_else(|_| Err(io::Error::from(io::ErrorKind::TimedOut))),
                    None => lookup.await,
                };
                let addrs: Vec<SocketAddr> = result
                    .map_err(|source| DialError::Resolve {
                        host: domain.clone(),
                        source,
                    })?
                    .collect();

                if addrs.is_empty() {
                    return Err(DialError::NoAddresses(domain.clone()));
                }
                Ok(addrs)
            }
        }
    }

    async fn connect_addr(&self, addr: SocketAddr) -> Result<TcpStream, DialError> {
        let connect = TcpStream::connect(addr);
        let result = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| DialError::Timeout(addr))?,
            None => connect.await,
        };

        result.map_err(|source| DialError::Connect { addr, source })
    }
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    async fn connect(&self, endpoint: &Endpoint) -> Result<TcpStream, DialError> {
        let addrs = self.lookup(endpoint).await?;

        // Try each resolved address in turn, keeping the last failure
        let mut last_err = None;
        for addr in addrs {
            match self.connect_addr(addr).await {
                Ok(stream) => {
                    self.socket_opts.hint(&stream);
                    tracing::debug!("TCP connection established to {} ({})", endpoint, addr);
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!("Dial attempt to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| DialError::NoAddresses(endpoint.host())))
    }
}
