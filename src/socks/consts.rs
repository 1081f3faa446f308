//! SOCKS5 protocol constants
//!
//! Defines all constants used in the SOCKS5 protocol implementation.

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;

// Commands
/// TCP CONNECT command
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;
/// TCP BIND command (not implemented)
pub const SOCKS5_CMD_TCP_BIND: u8 = 0x02;
/// UDP ASSOCIATE command (not implemented)
pub const SOCKS5_CMD_UDP_ASSOCIATE: u8 = 0x03;

// Address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// Reserved byte
/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Message sizes
/// Greeting header: VER NMETHODS
pub const GREETING_HEADER_LEN: usize = 2;
/// Request header: VER CMD RSV ATYP
pub const REQUEST_HEADER_LEN: usize = 4;
/// IPv4 address length
pub const IPV4_ADDR_LEN: usize = 4;
/// IPv6 address length
pub const IPV6_ADDR_LEN: usize = 16;
/// Port length
pub const PORT_LEN: usize = 2;
/// Connect reply with an IPv4 bound address
pub const CONNECT_REPLY_LEN: usize = 10;
/// Maximum domain name length
pub const MAX_DOMAIN_LEN: usize = 255;
