//! Stdio transport for the Model Context Protocol
//!
//! Reads newline-delimited JSON-RPC messages from the peer and writes one response line per request.

pub mod handlers;
pub mod transport;
