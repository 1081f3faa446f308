//! SOCKS5 connection handler
//!
//! Drives one accepted client through method negotiation, the CONNECT
//! request, the outbound dial and finally the relay.
//!
//! # Protocol Flow
//!
//! 1. Read the greeting (a wrong version ends the connection silently)
//! 2. Select "no authentication"
//! 3. Read the CONNECT request
//! 4. Interpret the destination address
//! 5. Dial the destination (failures are answered with a reply code)
//! 6. Send the success reply
//! 7. Relay until both directions finish
//!
//! Every early exit shuts the client down before returning.

use crate::config::SocksConfig;
use crate::error::{Result, SockrelayError, Socks5ReplyCode};
use crate::pool::BufferPool;
use crate::socks::command::{read_connect_request, send_reply, send_success};
use crate::socks::greeting::{read_greeting, select_method, send_method_selection};
use crate::socks::relay::{RelayReport, RelaySession};
use crate::socks::resolver::resolve;
use crate::socks::types::ConnectRequest;
use crate::transport::Dialer;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Handle one SOCKS5 client connection
///
/// Returns the relay report when the session reached the relay stage, or the
/// error that ended it earlier.
pub async fn handle_connection<S, D>(
    mut client: S,
    config: &SocksConfig,
    dialer: &D,
    pool: Arc<BufferPool>,
) -> Result<RelayReport>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    D: Dialer + ?Sized,
{
    let handshake = config.handshake_deadline();

    // Steps 1-3
    let request = match within(handshake, "handshake", negotiate(&mut client)).await {
        Ok(request) => request,
        Err(e) => {
            close(&mut client).await;
            return Err(e);
        }
    };

    // Step 4
    let endpoint = match resolve(&request) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            let _ = send_reply(&mut client, Socks5ReplyCode::GeneralFailure).await;
            close(&mut client).await;
            return Err(e.into());
        }
    };

    debug!("SOCKS5 {} request to {}", request.command, endpoint);

    // Step 5
    let mut destination = match dialer.connect(&endpoint).await {
        Ok(stream) => stream,
        Err(e) => {
            let code = Socks5ReplyCode::from(&e);
            debug!("Dial to {} failed ({:?}): {}", endpoint, code, e);
            let _ = send_reply(&mut client, code).await;
            close(&mut client).await;
            return Err(e.into());
        }
    };

    // Step 6
    if let Err(e) = within(handshake, "reply", send_success(&mut client)).await {
        close(&mut client).await;
        let _ = destination.shutdown().await;
        return Err(e);
    }

    debug!("SOCKS5 tunnel established to {}", endpoint);

    // Step 7
    Ok(RelaySession::new(client, destination)
        .run(pool, config.idle_deadline())
        .await)
}

/// Greeting, method selection and request
async fn negotiate<S>(client: &mut S) -> Result<ConnectRequest>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let greeting = read_greeting(client).await?;
    debug!("Client offered methods {:?}", greeting.methods);

    send_method_selection(client, select_method(&greeting)).await?;

    read_connect_request(client).await
}

/// Bound a handshake stage by the configured deadline
async fn within<F, T>(limit: Option<Duration>, stage: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            SockrelayError::Timeout(format!("SOCKS5 {} exceeded {:?}", stage, limit))
        })?,
        None => fut.await,
    }
}

async fn close<S>(client: &mut S)
where
    S: AsyncWrite + Unpin,
{
    let _ = client.shutdown().await;
}
