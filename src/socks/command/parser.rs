//! SOCKS5 request parser
//!
//! Parses SOCKS5 CONNECT requests from the client.

use crate::error::{ProtocolError, Result};
use crate::socks::consts::*;
use crate::socks::types::{ConnectRequest, Endpoint, SocksCommand};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Parse a complete CONNECT request
///
/// # SOCKS5 Request Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Only the minimum length implied by the address type is checked here;
/// the domain length byte is validated by the resolver.
pub fn parse_connect_request(raw: &[u8]) -> Result<ConnectRequest, ProtocolError> {
    if raw.len() < REQUEST_HEADER_LEN {
        return Err(ProtocolError::Truncated {
            needed: REQUEST_HEADER_LEN,
            actual: raw.len(),
        });
    }

    let (command, addr_type) = check_request_header(&raw[..REQUEST_HEADER_LEN])?;

    let needed = REQUEST_HEADER_LEN + min_destination_len(addr_type)?;
    if raw.len() < needed {
        return Err(ProtocolError::Truncated {
            needed,
            actual: raw.len(),
        });
    }

    Ok(ConnectRequest {
        command,
        addr_type,
        destination: Bytes::copy_from_slice(&raw[REQUEST_HEADER_LEN..]),
    })
}

/// Read a CONNECT request from the stream
///
/// Reads exactly the bytes the request declares, so data the client
/// pipelines after the request stays in the stream for the relay.
pub async fn read_connect_request<S>(stream: &mut S) -> Result<ConnectRequest>
where
    S: AsyncRead + Unpin,
{
    // Read: VER CMD RSV ATYP
    let mut header = [0u8; REQUEST_HEADER_LEN];
    stream.read_exact(&mut header).await?;

    let (_, addr_type) = check_request_header(&header)?;

    let mut raw = header.to_vec();
    match addr_type {
        SOCKS5_ADDR_TYPE_DOMAIN => {
            let mut len_buf = [0u8; 1];
            stream.read_exact(&mut len_buf).await?;
            raw.push(len_buf[0]);

            let start = raw.len();
            raw.resize(start + len_buf[0] as usize + PORT_LEN, 0);
            stream.read_exact(&mut raw[start..]).await?;
        }
        _ => {
            let start = raw.len();
            raw.resize(start + min_destination_len(addr_type)?, 0);
            stream.read_exact(&mut raw[start..]).await?;
        }
    }

    let request = parse_connect_request(&raw)?;
    tracing::trace!(
        "Parsed SOCKS5 {} request, address type {}",
        request.command,
        request.addr_type
    );

    Ok(request)
}

/// Encode a CONNECT request for the given endpoint
pub fn encode_connect_request(endpoint: &Endpoint) -> Result<Vec<u8>, ProtocolError> {
    let mut request = vec![SOCKS5_VERSION, SOCKS5_CMD_TCP_CONNECT, SOCKS5_RESERVED];
    request.extend_from_slice(&endpoint.to_bytes()?);
    Ok(request)
}

/// Validate `VER CMD RSV ATYP`, returning the command and address type
fn check_request_header(header: &[u8]) -> Result<(SocksCommand, u8), ProtocolError> {
    let version = header[0];
    let cmd_byte = header[1];
    let addr_type = header[3];

    if version != SOCKS5_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let command = match SocksCommand::from_byte(cmd_byte) {
        Some(SocksCommand::Connect) => SocksCommand::Connect,
        _ => return Err(ProtocolError::CommandNotSupported(cmd_byte)),
    };

    min_destination_len(addr_type)?;

    Ok((command, addr_type))
}

/// Shortest `DST.ADDR + DST.PORT` allowed for an address type
fn min_destination_len(addr_type: u8) -> Result<usize, ProtocolError> {
    match addr_type {
        SOCKS5_ADDR_TYPE_IPV4 => Ok(IPV4_ADDR_LEN + PORT_LEN),
        SOCKS5_ADDR_TYPE_DOMAIN => Ok(1 + PORT_LEN),
        SOCKS5_ADDR_TYPE_IPV6 => Ok(IPV6_ADDR_LEN + PORT_LEN),
        _ => Err(ProtocolError::AddressTypeNotSupported(addr_type)),
    }
}
