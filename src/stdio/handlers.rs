//! Per-line message handling
//!
//! Parses one line of input and handles single messages as well as batches.

use serde_json::Value;

use crate::mcp::rpc::{json_rpc_error, INVALID_REQUEST, PARSE_ERROR};
use crate::mcp::server::handle_json_rpc_value;
use crate::AppState;

/// Returns the line to write back, or `None` when nothing is owed to the peer.
pub async fn handle_line(state: &AppState, line: &str) -> Option<Value> {
    let payload: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(_) => return Some(json_rpc_error(None, PARSE_ERROR, "Parse error")),
    };

    if let Some(batch) = payload.as_array() {
        if batch.is_empty() {
            return Some(json_rpc_error(None, INVALID_REQUEST, "Invalid Request"));
        }

        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = handle_json_rpc_value(state, item.clone()).await {
                responses.push(response);
            }
        }

        if responses.is_empty() {
            return None;
        }

        return Some(Value::Array(responses));
    }

    handle_json_rpc_value(state, payload).await
}
