//! Address resolver
//!
//! Turns the raw destination bytes of a CONNECT request into an [`Endpoint`].
//! No DNS lookup happens here; domain names are looked up by the dialer.

use crate::error::ProtocolError;
use crate::socks::consts::*;
use crate::socks::types::{ConnectRequest, Endpoint};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Interpret the address field and port of a request
pub fn resolve(request: &ConnectRequest) -> Result<Endpoint, ProtocolError> {
    let dst = &request.destination[..];

    match request.addr_type {
        SOCKS5_ADDR_TYPE_IPV4 => {
            let octets: [u8; IPV4_ADDR_LEN] = take(dst, 0)?;
            let port = read_port(dst, IPV4_ADDR_LEN)?;
            Ok(Endpoint::ipv4(Ipv4Addr::from(octets), port))
        }

        SOCKS5_ADDR_TYPE_DOMAIN => {
            let domain_len = *dst.first().ok_or(ProtocolError::Truncated {
                needed: 1,
                actual: 0,
            })? as usize;

            if domain_len == 0 {
                return Err(ProtocolError::InvalidDomain("empty domain name".to_string()));
            }

            let end = 1 + domain_len;
            let name = dst.get(1..end).ok_or(ProtocolError::Truncated {
                needed: end + PORT_LEN,
                actual: dst.len(),
            })?;
            let port = read_port(dst, end)?;

            let domain = std::str::from_utf8(name).map_err(|_| {
                ProtocolError::InvalidDomain(String::from_utf8_lossy(name).into_owned())
            })?;

            Ok(Endpoint::domain(domain, port))
        }

        SOCKS5_ADDR_TYPE_IPV6 => {
            let octets: [u8; IPV6_ADDR_LEN] = take(dst, 0)?;
            let port = read_port(dst, IPV6_ADDR_LEN)?;
            Ok(Endpoint::ipv6(Ipv6Addr::from(octets), port))
        }

        other => Err(ProtocolError::AddressTypeNotSupported(other)),
    }
}

/// Copy `N` bytes starting at `offset`
fn take<const N: usize>(dst: &[u8], offset: usize) -> Result<[u8; N], ProtocolError> {
    dst.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(ProtocolError::Truncated {
            needed: offset + N,
            actual: dst.len(),
        })
}

/// Big-endian port at `offset`
fn read_port(dst: &[u8], offset: usize) -> Result<u16, ProtocolError> {
    take::<PORT_LEN>(dst, offset).map(u16::from_be_bytes)
}
