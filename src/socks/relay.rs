//! TCP relay for established CONNECT sessions
//!
//! Copies data between the client and the destination in both directions.
//! Each direction runs as its own task with its own pooled buffer and reports
//! through its own join handle. A direction that reaches end-of-stream (or
//! fails) shuts down its writer, which lets the opposite direction drain and
//! finish on its own; neither direction cancels the other. Idleness is
//! measured across the whole session, so a direction that only waits stays
//! open while the other one keeps moving data.

use crate::helper::{until_idle, Activity};
use crate::pool::BufferPool;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinError;
use tracing::{debug, trace};

/// Outcome of one copy direction
#[derive(Debug, Default)]
pub struct DirectionReport {
    /// Bytes written to the far side
    pub bytes: u64,
    /// Error that ended the direction, if any
    pub error: Option<io::Error>,
}

impl DirectionReport {
    fn from_join(result: Result<DirectionReport, JoinError>) -> Self {
        result.unwrap_or_else(|e| DirectionReport {
            bytes: 0,
            error: Some(io::Error::other(e)),
        })
    }

    /// Whether the direction ended at end-of-stream
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for DirectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(e) => write!(f, "{} bytes ({})", self.bytes, e),
            None => write!(f, "{} bytes", self.bytes),
        }
    }
}

/// Outcome of both directions of a session
#[derive(Debug, Default)]
pub struct RelayReport {
    /// Client to destination
    pub client_to_dest: DirectionReport,
    /// Destination to client
    pub dest_to_client: DirectionReport,
}

impl RelayReport {
    /// Bytes moved in both directions
    pub fn total_bytes(&self) -> u64 {
        self.client_to_dest.bytes + self.dest_to_client.bytes
    }

    /// First error seen, client side first
    pub fn first_error(&self) -> Option<&io::Error> {
        self.client_to_dest
            .error
            .as_ref()
            .or(self.dest_to_client.error.as_ref())
    }
}

/// A client paired with its connected destination
///
/// Owns both streams; running the session consumes them and both are closed
/// when it returns.
pub struct RelaySession<C, D> {
    client: C,
    destination: D,
}

impl<C, D> RelaySession<C, D>
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    D: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Pair a client with its destination
    pub fn new(client: C, destination: D) -> Self {
        RelaySession {
            client,
            destination,
        }
    }

    /// Relay until both directions are finished
    pub async fn run(self, pool: Arc<BufferPool>, idle: Option<Duration>) -> RelayReport {
        relay(self.client, self.destination, pool, idle).await
    }
}

/// Relay data bidirectionally between two streams
///
/// Returns once both directions have finished. `idle` ends a direction only
/// after neither direction has moved bytes for that long; `None` lets a
/// direction wait indefinitely.
pub async fn relay<C, D>(
    client: C,
    destination: D,
    pool: Arc<BufferPool>,
    idle: Option<Duration>,
) -> RelayReport
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    D: AsyncRead + AsyncWrite + Send + 'static,
{
    let (client_read, client_write) = tokio::io::split(client);
    let (dest_read, dest_write) = tokio::io::split(destination);
    let activity = Arc::new(Activity::new());

    let upstream = tokio::spawn(copy_direction(
        client_read,
        dest_write,
        Arc::clone(&pool),
        idle,
        Arc::clone(&activity),
    ));
    let downstream = tokio::spawn(copy_direction(
        dest_read,
        client_write,
        pool,
        idle,
        activity,
    ));

    let (client_to_dest, dest_to_client) = tokio::join!(upstream, downstream);

    let report = RelayReport {
        client_to_dest: DirectionReport::from_join(client_to_dest),
        dest_to_client: DirectionReport::from_join(dest_to_client),
    };
    debug!(
        "Relay finished: client->dest {}, dest->client {}",
        report.client_to_dest, report.dest_to_client
    );

    report
}

/// Copy one direction until end-of-stream or error, then half-close
async fn copy_direction<R, W>(
    mut reader: R,
    mut writer: W,
    pool: Arc<BufferPool>,
    idle: Option<Duration>,
    activity: Arc<Activity>,
) -> DirectionReport
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = pool.lease();
    let mut bytes = 0u64;

    let error = loop {
        let n = match until_idle(idle, &activity, reader.read(&mut buf)).await {
            Ok(0) => break None,
            Ok(n) => n,
            Err(e) => break Some(e),
        };
        activity.touch();

        if let Err(e) = until_idle(idle, &activity, writer.write_all(&buf[..n])).await {
            break Some(e);
        }
        activity.touch();
        bytes += n as u64;
    };

    // The peer may already be gone; a failed shutdown does not change the outcome
    if let Err(e) = writer.shutdown().await {
        trace!("Shutdown after relay direction failed: {}", e);
    }

    DirectionReport { bytes, error }
}
