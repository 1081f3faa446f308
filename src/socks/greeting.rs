//! SOCKS5 method negotiation
//!
//! Parses the client greeting and answers it. Only "no authentication" is
//! spoken, and it is selected regardless of what the client offered.

use super::consts::*;
use super::types::ClientGreeting;
use crate::error::{ProtocolError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Parse a complete greeting
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 0 to 255 |
/// +----+----------+----------+
/// ```
pub fn parse_greeting(raw: &[u8]) -> Result<ClientGreeting, ProtocolError> {
    if raw.len() < GREETING_HEADER_LEN {
        return Err(ProtocolError::Truncated {
            needed: GREETING_HEADER_LEN,
            actual: raw.len(),
        });
    }

    let version = raw[0];
    if version != SOCKS5_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let num_methods = raw[1] as usize;
    let needed = GREETING_HEADER_LEN + num_methods;
    if raw.len() < needed {
        return Err(ProtocolError::Truncated {
            needed,
            actual: raw.len(),
        });
    }

    Ok(ClientGreeting {
        version,
        methods: raw[GREETING_HEADER_LEN..needed].to_vec(),
    })
}

/// Encode the method-selection reply
pub fn encode_method_selection(method: u8) -> [u8; 2] {
    [SOCKS5_VERSION, method]
}

/// Pick the method to answer a greeting with
///
/// No other method is implemented, so "no authentication" is chosen even
/// when the client did not offer it.
pub fn select_method(_greeting: &ClientGreeting) -> u8 {
    SOCKS5_AUTH_METHOD_NONE
}

/// Read a greeting from the stream
///
/// The version is checked as soon as the two header bytes arrive, so a
/// non-SOCKS5 client is rejected without waiting for its method list.
pub async fn read_greeting<S>(stream: &mut S) -> Result<ClientGreeting>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; GREETING_HEADER_LEN];
    stream.read_exact(&mut header).await?;

    if header[0] != SOCKS5_VERSION {
        return Err(ProtocolError::UnsupportedVersion(header[0]).into());
    }

    let mut raw = vec![0u8; GREETING_HEADER_LEN + header[1] as usize];
    raw[..GREETING_HEADER_LEN].copy_from_slice(&header);
    stream.read_exact(&mut raw[GREETING_HEADER_LEN..]).await?;

    Ok(parse_greeting(&raw)?)
}

/// Write the method-selection reply
pub async fn send_method_selection<S>(stream: &mut S, method: u8) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&encode_method_selection(method)).await?;
    stream.flush().await?;
    Ok(())
}
