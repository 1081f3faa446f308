//! # Sockrelay - SOCKS5 CONNECT Relay
//!
//! Sockrelay is a small SOCKS5 proxy server. It accepts TCP clients,
//! negotiates the "no authentication" method, serves the CONNECT command for
//! IPv4, IPv6 and domain destinations, and relays bytes in both directions
//! until either side closes.
//!
//! ## Features
//!
//! - **CONNECT only**: BIND and UDP ASSOCIATE are refused
//! - **No authentication**: method 0x00 is always selected
//! - **Pooled copy buffers**: one bounded pool shared by all relay directions
//! - **Deadlines**: optional handshake, connect and idle timeouts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockrelay::config::load_config;
//! use sockrelay::server::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_server(config, shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SOCKS5 Client -> Listener -> Handler -> Dialer -> Target
//!                                 \-> Relay (two tasks, pooled buffers)
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod helper;
pub mod pool;
pub mod server;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{ProtocolError, SockrelayError, Socks5ReplyCode};
pub use server::{run_server, Server};

/// Version of the Sockrelay library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
