//! Model Context Protocol (MCP) request handling
//!
//! Provides the envelope model, the request dispatcher and the JSON-RPC decoding and formatting around it.

pub mod dispatcher;
pub mod envelope;
pub mod rpc;
pub mod server;
