//! SOCKS5 reply builder
//!
//! Constructs SOCKS5 connect replies.

use crate::error::{Result, Socks5ReplyCode};
use crate::socks::consts::*;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Encode a connect reply
///
/// # SOCKS5 Reply Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// The bound address is always the `0.0.0.0:0` placeholder rather than the
/// real local endpoint of the outbound socket.
pub fn encode_connect_reply(code: Socks5ReplyCode) -> [u8; CONNECT_REPLY_LEN] {
    [
        SOCKS5_VERSION,
        code.into(),
        SOCKS5_RESERVED,
        SOCKS5_ADDR_TYPE_IPV4,
        0,
        0,
        0,
        0,
        0,
        0,
    ]
}

/// Write a connect reply to the stream
pub async fn send_reply<S>(stream: &mut S, code: Socks5ReplyCode) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&encode_connect_reply(code)).await?;
    stream.flush().await?;

    Ok(())
}

/// Write a success reply
pub async fn send_success<S>(stream: &mut S) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    send_reply(stream, Socks5ReplyCode::Succeeded).await
}
