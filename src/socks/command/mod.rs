//! SOCKS5 command module
//!
//! Handles parsing SOCKS5 requests and building replies.

mod parser;
mod reply;

pub use parser::{encode_connect_request, parse_connect_request, read_connect_request};
pub use reply::{encode_connect_reply, send_reply, send_success};
