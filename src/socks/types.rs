//! SOCKS5 type definitions
//!
//! Defines the core types used in SOCKS5 protocol handling.

use super::consts::*;
use crate::error::ProtocolError;
use bytes::Bytes;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// SOCKS5 command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// TCP BIND - wait for incoming connection (not supported)
    Bind,
    /// UDP ASSOCIATE - establish UDP relay (not supported)
    UdpAssociate,
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_CMD_TCP_CONNECT => Some(SocksCommand::Connect),
            SOCKS5_CMD_TCP_BIND => Some(SocksCommand::Bind),
            SOCKS5_CMD_UDP_ASSOCIATE => Some(SocksCommand::UdpAssociate),
            _ => None,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
            SocksCommand::UdpAssociate => write!(f, "UDP ASSOCIATE"),
        }
    }
}

/// Client greeting: `VER NMETHODS METHODS...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientGreeting {
    /// Protocol version (always 0x05 once parsed)
    pub version: u8,
    /// Offered authentication methods
    pub methods: Vec<u8>,
}

/// Parsed CONNECT request
///
/// The bytes after the address-type byte are kept raw; turning them into an
/// [`Endpoint`] is left to [`resolve`](crate::socks::resolve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Requested command (always CONNECT once parsed)
    pub command: SocksCommand,
    /// Address type byte
    pub addr_type: u8,
    /// Address field followed by the 2-byte port
    pub destination: Bytes,
}

/// Destination of a CONNECT request
///
/// Either an IP socket address or a domain name that still needs a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// IP address with port
    Ip(SocketAddr),
    /// Domain name with port
    Domain(String, u16),
}

impl Endpoint {
    /// Create a new Endpoint from an IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        Endpoint::Ip(SocketAddr::new(IpAddr::V4(ip), port))
    }

    /// Create a new Endpoint from an IPv6 address and port
    pub fn ipv6(ip: Ipv6Addr, port: u16) -> Self {
        Endpoint::Ip(SocketAddr::new(IpAddr::V6(ip), port))
    }

    /// Create a new Endpoint from a domain name and port
    pub fn domain(domain: impl Into<String>, port: u16) -> Self {
        Endpoint::Domain(domain.into(), port)
    }

    /// Host part: dotted quad, IPv6 colon form, or the domain name
    pub fn host(&self) -> String {
        match self {
            Endpoint::Ip(addr) => addr.ip().to_string(),
            Endpoint::Domain(domain, _) => domain.clone(),
        }
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        match self {
            Endpoint::Ip(addr) => addr.port(),
            Endpoint::Domain(_, port) => *port,
        }
    }

    /// Get the address type byte for SOCKS5 protocol
    pub fn addr_type(&self) -> u8 {
        match self {
            Endpoint::Ip(SocketAddr::V4(_)) => SOCKS5_ADDR_TYPE_IPV4,
            Endpoint::Ip(SocketAddr::V6(_)) => SOCKS5_ADDR_TYPE_IPV6,
            Endpoint::Domain(_, _) => SOCKS5_ADDR_TYPE_DOMAIN,
        }
    }

    /// Serialize as `ATYP ADDR PORT`
    ///
    /// Fails for a domain longer than its one-byte length prefix can express.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut bytes = Vec::new();

        match self {
            Endpoint::Ip(SocketAddr::V4(addr)) => {
                bytes.push(SOCKS5_ADDR_TYPE_IPV4);
                bytes.extend_from_slice(&addr.ip().octets());
                bytes.extend_from_slice(&addr.port().to_be_bytes());
            }
            Endpoint::Ip(SocketAddr::V6(addr)) => {
                bytes.push(SOCKS5_ADDR_TYPE_IPV6);
                bytes.extend_from_slice(&addr.ip().octets());
                bytes.extend_from_slice(&addr.port().to_be_bytes());
            }
            Endpoint::Domain(domain, port) => {
                let len = u8::try_from(domain.len()).map_err(|_| {
                    ProtocolError::InvalidDomain(format!(
                        "{} bytes exceeds {}",
                        domain.len(),
                        MAX_DOMAIN_LEN
                    ))
                })?;
                bytes.push(SOCKS5_ADDR_TYPE_DOMAIN);
                bytes.push(len);
                bytes.extend_from_slice(domain.as_bytes());
                bytes.extend_from_slice(&port.to_be_bytes());
            }
        }

        Ok(bytes)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Ip(addr) => write!(f, "{}", addr),
            Endpoint::Domain(domain, port) => write!(f, "{}:{}", domain, port),
        }
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Endpoint::Ip(addr)
    }
}
