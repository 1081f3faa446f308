//! SOCKS5 module for Sockrelay
//!
//! This module implements the server side of SOCKS5 CONNECT (RFC 1928)
//! without authentication: message codecs, destination address handling,
//! the per-connection state machine and the bidirectional relay.

mod command;
mod consts;
mod greeting;
mod handler;
mod relay;
mod resolver;
mod types;

pub use command::{
    encode_connect_reply, encode_connect_request, parse_connect_request, read_connect_request,
    send_reply, send_success,
};
pub use consts::*;
pub use greeting::{
    encode_method_selection, parse_greeting, read_greeting, select_method, send_method_selection,
};
pub use handler::handle_connection;
pub use relay::{relay, DirectionReport, RelayReport, RelaySession};
pub use resolver::resolve;
pub use types::{ClientGreeting, ConnectRequest, Endpoint, SocksCommand};
