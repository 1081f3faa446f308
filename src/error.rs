//! Error types for Sockrelay
//!
//! This module defines all custom error types used throughout the application.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Result alias used by the SOCKS5 layer
pub type Result<T, E = SockrelayError> = std::result::Result<T, E>;

/// Main error type for Sockrelay operations
#[derive(Error, Debug)]
pub enum SockrelayError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or unsupported SOCKS5 input
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Outbound connection could not be established
    #[error("Dial error: {0}")]
    Dial(#[from] DialError),

    /// Listener could not be bound
    #[error("Failed to listen on {addr}: {source}")]
    Listen {
        /// Address the listener tried to bind
        addr: String,
        /// Underlying bind error
        #[source]
        source: io::Error,
    },

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl SockrelayError {
    /// Whether the error was caused by a client violating the protocol
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, SockrelayError::Protocol(_))
    }
}

/// SOCKS5 wire-format violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Unsupported SOCKS version
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Message shorter than its header or address type requires
    #[error("Truncated message: need {needed} bytes, got {actual}")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes available
        actual: usize,
    },

    /// Command not supported
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Address type not supported
    #[error("Unsupported address type: {0}")]
    AddressTypeNotSupported(u8),

    /// Invalid domain name
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    /// Reply status outside the SOCKS5 table
    #[error("Unknown reply code: {0}")]
    UnknownReplyCode(u8),
}

/// Failures while opening the outbound connection
#[derive(Error, Debug)]
pub enum DialError {
    /// Name lookup failed
    #[error("Failed to resolve {host}: {source}")]
    Resolve {
        /// Domain being resolved
        host: String,
        /// Lookup error
        #[source]
        source: io::Error,
    },

    /// Name lookup returned nothing
    #[error("No addresses found for {0}")]
    NoAddresses(String),

    /// TCP connect failed
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        /// Address that was dialed
        addr: SocketAddr,
        /// Connect error
        #[source]
        source: io::Error,
    },

    /// TCP connect did not finish in time
    #[error("Connection timeout to {0}")]
    Timeout(SocketAddr),
}

/// Reply codes for SOCKS5 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Socks5ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddressTypeNotSupported = 0x08,
}

impl From<Socks5ReplyCode> for u8 {
    fn from(code: Socks5ReplyCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for Socks5ReplyCode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Socks5ReplyCode::Succeeded),
            0x01 => Ok(Socks5ReplyCode::GeneralFailure),
            0x02 => Ok(Socks5ReplyCode::ConnectionNotAllowed),
            0x03 => Ok(Socks5ReplyCode::NetworkUnreachable),
            0x04 => Ok(Socks5ReplyCode::HostUnreachable),
            0x05 => Ok(Socks5ReplyCode::ConnectionRefused),
            0x06 => Ok(Socks5ReplyCode::TtlExpired),
            0x07 => Ok(Socks5ReplyCode::CommandNotSupported),
            0x08 => Ok(Socks5ReplyCode::AddressTypeNotSupported),
            _ => Err(ProtocolError::UnknownReplyCode(value)),
        }
    }
}

impl From<&io::Error> for Socks5ReplyCode {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Socks5ReplyCode::ConnectionRefused,
            io::ErrorKind::NetworkUnreachable => Socks5ReplyCode::NetworkUnreachable,
            io::ErrorKind::HostUnreachable => Socks5ReplyCode::HostUnreachable,
            io::ErrorKind::TimedOut => Socks5ReplyCode::HostUnreachable,
            io::ErrorKind::AddrNotAvailable => Socks5ReplyCode::HostUnreachable,
            _ => Socks5ReplyCode::GeneralFailure,
        }
    }
}

impl From<&DialError> for Socks5ReplyCode {
    fn from(err: &DialError) -> Self {
        match err {
            DialError::Resolve { .. } | DialError::NoAddresses(_) => {
                Socks5ReplyCode::HostUnreachable
            }
            DialError::Connect { source, .. } => Socks5ReplyCode::from(source),
            DialError::Timeout(_) => Socks5ReplyCode::HostUnreachable,
        }
    }
}
