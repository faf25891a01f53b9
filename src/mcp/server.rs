//! The central Model Context Protocol engine
//!
//! Decodes JSON-RPC messages, answers the protocol-only methods (`initialize`,
//! `ping`) itself and turns everything else into a [`RequestEnvelope`] for the
//! [`Dispatcher`](crate::mcp::dispatcher::Dispatcher).

use std::time::Instant;

use rust_mcp_sdk::schema::{
    CallToolRequestParams, CallToolResult, ContentBlock, Implementation, InitializeResult,
    JsonrpcMessage, ListResourcesResult, ListToolsResult, ReadResourceContent,
    ReadResourceRequestParams, ReadResourceResult, Resource, ServerCapabilities,
    ServerCapabilitiesResources, ServerCapabilitiesTools, TextContent, TextResourceContents, Tool,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::mcp::envelope::{ContentItem, RequestEnvelope, ResponseEnvelope, SuccessPayload};
use crate::mcp::rpc::{
    app_error_to_json_rpc, is_json_rpc_error, json_rpc_error, json_rpc_result,
    request_id_to_value, INVALID_REQUEST, METHOD_NOT_FOUND,
};
use crate::registry::{CapabilityDescriptor, ResourceDescriptor};
use crate::{errors::AppError, AppState};

/// Newest first; the first entry is offered when the peer asks for anything else.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

pub async fn handle_json_rpc_value(state: &AppState, payload: Value) -> Option<Value> {
    if !payload.is_object() {
        return Some(json_rpc_error(None, INVALID_REQUEST, "Invalid Request"));
    }

    let request_id = payload.get("id").cloned();
    let parsed: JsonrpcMessage = match serde_json::from_value(payload) {
        Ok(message) => message,
        Err(_) => return Some(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request")),
    };

    match parsed {
        JsonrpcMessage::Request(request) => {
            let request_id = request_id_to_value(request.id);
            if request.method.trim().is_empty() {
                return Some(json_rpc_error(
                    Some(request_id),
                    INVALID_REQUEST,
                    "Invalid Request",
                ));
            }

            Some(
                handle_json_rpc_request(
                    state,
                    Some(request_id),
                    request.method,
                    request.params.map(Value::Object),
                )
                .await,
            )
        }
        JsonrpcMessage::Notification(notification) => {
            debug!(method = %notification.method, "notification received");
            None
        }
        JsonrpcMessage::ResultResponse(_) | JsonrpcMessage::ErrorResponse(_) => {
            Some(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request"))
        }
    }
}

pub async fn handle_json_rpc_request(
    state: &AppState,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
) -> Value {
    let started_at = Instant::now();

    let response = match method.as_str() {
        "initialize" => match initialize_result(params.as_ref()) {
            Ok(result) => json_rpc_result(id, result),
            Err(err) => app_error_to_json_rpc(id, err),
        },
        "ping" => json_rpc_result(id, json!({})),
        _ => match decode_request(&method, params) {
            Ok(Some(request)) => {
                let envelope = state.dispatcher.deliver(request).await;
                encode_response(id, envelope)
            }
            Ok(None) => json_rpc_error(id, METHOD_NOT_FOUND, "Method not found"),
            Err(err) => app_error_to_json_rpc(id, err),
        },
    };

    info!(
        method = %method,
        outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
        duration_ms = started_at.elapsed().as_millis(),
        "mcp action audited"
    );

    response
}

/// Maps an MCP method onto a request envelope. `Ok(None)` means the method is unknown.
pub fn decode_request(
    method: &str,
    params: Option<Value>,
) -> Result<Option<RequestEnvelope>, AppError> {
    let request = match method {
        "tools/list" => RequestEnvelope::ListTools,
        "resources/list" => RequestEnvelope::ListResources,
        "tools/call" => {
            let tool_call: CallToolRequestParams = params
                .and_then(|raw| serde_json::from_value(raw).ok())
                .ok_or_else(|| {
                    AppError::bad_request("invalid_params", "tools/call params require a tool name")
                })?;
            RequestEnvelope::CallTool {
                name: tool_call.name,
                arguments: tool_call.arguments.unwrap_or_default(),
            }
        }
        "resources/read" => {
            let resource_read: ReadResourceRequestParams = params
                .and_then(|raw| serde_json::from_value(raw).ok())
                .ok_or_else(|| {
                    AppError::bad_request("invalid_params", "resources/read params require a uri")
                })?;
            RequestEnvelope::ReadResource {
                uri: resource_read.uri,
            }
        }
        _ => return Ok(None),
    };

    Ok(Some(request))
}

pub fn encode_response(id: Option<Value>, envelope: ResponseEnvelope) -> Value {
    let encoded = match envelope {
        ResponseEnvelope::Failure(err) => return app_error_to_json_rpc(id, err),
        ResponseEnvelope::Success(SuccessPayload::Tools(tools)) => {
            to_result_value(ListToolsResult {
                meta: None,
                next_cursor: None,
                tools: build_tools_list(tools),
            })
        }
        ResponseEnvelope::Success(SuccessPayload::Resources(resources)) => {
            to_result_value(ListResourcesResult {
                meta: None,
                next_cursor: None,
                resources: build_resources_list(resources),
            })
        }
        ResponseEnvelope::Success(SuccessPayload::Content(items)) => {
            to_result_value(CallToolResult {
                content: items
                    .into_iter()
                    .map(|item| match item {
                        ContentItem::Text { text } => {
                            ContentBlock::from(TextContent::new(text, None, None))
                        }
                    })
                    .collect(),
                is_error: None,
                meta: None,
                structured_content: None,
            })
        }
        ResponseEnvelope::Success(SuccessPayload::ResourceContents(contents)) => {
            to_result_value(ReadResourceResult {
                contents: contents
                    .into_iter()
                    .map(|content| {
                        ReadResourceContent::from(TextResourceContents {
                            meta: None,
                            mime_type: Some(content.mime_type),
                            text: content.text,
                            uri: content.uri,
                        })
                    })
                    .collect(),
                meta: None,
            })
        }
    };

    match encoded {
        Ok(result) => json_rpc_result(id, result),
        Err(err) => app_error_to_json_rpc(id, err),
    }
}

pub fn build_tools_list(descriptors: Vec<CapabilityDescriptor>) -> Vec<Tool> {
    descriptors
        .into_iter()
        .map(|descriptor| Tool {
            annotations: None,
            description: Some(descriptor.description),
            execution: None,
            icons: vec![],
            input_schema: descriptor.input_schema.to_tool_input_schema(),
            meta: None,
            name: descriptor.name,
            output_schema: None,
            title: None,
        })
        .collect()
}

pub fn build_resources_list(descriptors: Vec<ResourceDescriptor>) -> Vec<Resource> {
    descriptors
        .into_iter()
        .map(|descriptor| Resource {
            annotations: None,
            description: Some(descriptor.description),
            icons: vec![],
            meta: None,
            mime_type: Some(descriptor.mime_type),
            name: descriptor.name,
            size: None,
            title: None,
            uri: descriptor.uri,
        })
        .collect()
}

fn to_result_value(result: impl Serialize) -> Result<Value, AppError> {
    serde_json::to_value(result)
        .map_err(|err| AppError::internal(format!("result serialization failed: {err}")))
}

pub fn initialize_result(params: Option<&Value>) -> Result<Value, AppError> {
    let protocol_version = negotiate_protocol_version(params)?;

    to_result_value(InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(false),
            }),
            resources: Some(ServerCapabilitiesResources {
                subscribe: Some(false),
                list_changed: Some(false),
            }),
            prompts: None,
            ..Default::default()
        },
        protocol_version: protocol_version.to_string(),
        instructions: None,
        meta: None,
    })
}

pub fn negotiate_protocol_version(params: Option<&Value>) -> Result<&'static str, AppError> {
    let offered_version = params
        .and_then(Value::as_object)
        .and_then(|object| object.get("protocolVersion"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|version| !version.is_empty())
        .ok_or_else(|| {
            AppError::bad_request(
                "invalid_protocol_version",
                "initialize params.protocolVersion is required",
            )
        })?;

    Ok(SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .copied()
        .find(|version| *version == offered_version)
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use rust_mcp_sdk::schema::{ListResourcesResult, ListToolsResult};

    use super::{
        decode_request, handle_json_rpc_value, negotiate_protocol_version,
        SUPPORTED_PROTOCOL_VERSIONS,
    };
    use crate::{mcp::envelope::RequestEnvelope, AppState};

    fn state() -> AppState {
        AppState::with_builtins("server.json").expect("app state")
    }

    async fn roundtrip(payload: Value) -> Value {
        handle_json_rpc_value(&state(), payload)
            .await
            .expect("request should produce a response")
    }

    #[test]
    fn negotiate_protocol_version_echoes_supported_version() {
        let params = json!({ "protocolVersion": "2024-11-05" });
        let version = negotiate_protocol_version(Some(&params)).expect("supported version");
        assert_eq!(version, "2024-11-05");
    }

    #[test]
    fn negotiate_protocol_version_falls_back_to_latest() {
        let params = json!({ "protocolVersion": "2030-01-01" });
        let version = negotiate_protocol_version(Some(&params)).expect("fallback version");
        assert_eq!(version, SUPPORTED_PROTOCOL_VERSIONS[0]);
    }

    #[test]
    fn negotiate_protocol_version_requires_version() {
        let error = negotiate_protocol_version(Some(&json!({}))).expect_err("missing version");
        assert!(error.to_string().contains("bad request"));
    }

    #[test]
    fn decodes_tool_call_without_arguments() {
        let request = decode_request("tools/call", Some(json!({ "name": "get_system_info" })))
            .expect("valid params")
            .expect("known method");
        assert_eq!(
            request,
            RequestEnvelope::CallTool {
                name: "get_system_info".to_string(),
                arguments: serde_json::Map::new(),
            }
        );
    }

    #[tokio::test]
    async fn tools_call_without_params_is_invalid_params() {
        let response =
            roundtrip(json!({ "jsonrpc": "2.0", "id": 10, "method": "tools/call" })).await;
        assert_eq!(response["error"]["code"], -32602);
        assert_eq!(response["error"]["data"]["code"], "invalid_params");
    }

    #[test]
    fn rejects_tool_call_without_params() {
        assert!(decode_request("tools/call", None).is_err());
        assert!(decode_request("resources/read", Some(json!({ "url": "x" }))).is_err());
        assert!(matches!(decode_request("prompts/list", None), Ok(None)));
    }

    #[tokio::test]
    async fn initialize_reports_server_info_and_capabilities() {
        let response = roundtrip(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "clientInfo": { "name": "test-client", "version": "1.0.0" },
                "capabilities": {}
            }
        }))
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], env!("CARGO_PKG_NAME"));
        assert!(response["result"]["capabilities"]["tools"].is_object());
        assert!(response["result"]["capabilities"]["resources"].is_object());
    }

    #[tokio::test]
    async fn ping_returns_empty_result() {
        let response = roundtrip(json!({ "jsonrpc": "2.0", "id": 9, "method": "ping" })).await;
        assert_eq!(response["id"], 9);
        assert_eq!(response["result"], json!({}));
    }

    #[tokio::test]
    async fn tools_list_returns_descriptors_in_order() {
        let response =
            roundtrip(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {} }))
                .await;

        let tools = response["result"]["tools"].as_array().expect("tools array");
        let names = tools
            .iter()
            .map(|tool| tool["name"].as_str().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["echo", "calculate", "get_system_info"]);
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["message"]));
        assert_eq!(
            tools[1]["inputSchema"]["properties"]["operation"]["enum"],
            json!(["add", "subtract", "multiply", "divide"])
        );
    }

    #[tokio::test]
    async fn list_results_decode_as_sdk_types() {
        let response =
            roundtrip(json!({ "jsonrpc": "2.0", "id": 11, "method": "tools/list" })).await;
        let listed: ListToolsResult =
            serde_json::from_value(response["result"].clone()).expect("tools list result");
        let system_info = listed
            .tools
            .iter()
            .find(|tool| tool.name == "get_system_info")
            .expect("system info tool listed");
        assert!(system_info.input_schema.required.is_empty());
        assert!(system_info.description.is_some());

        let response =
            roundtrip(json!({ "jsonrpc": "2.0", "id": 12, "method": "resources/list" })).await;
        let listed: ListResourcesResult =
            serde_json::from_value(response["result"].clone()).expect("resources list result");
        assert_eq!(listed.resources.len(), 1);
        assert_eq!(listed.resources[0].name, "Server Manifest");
        assert_eq!(
            listed.resources[0].mime_type.as_deref(),
            Some("application/json")
        );
        assert!(listed.next_cursor.is_none());
    }

    #[tokio::test]
    async fn tools_call_echo_returns_text_content() {
        let response = roundtrip(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": { "name": "echo", "arguments": { "message": "hi" } }
        }))
        .await;

        assert_eq!(response["result"]["content"][0]["type"], "text");
        assert_eq!(response["result"]["content"][0]["text"], "Echo: hi");
    }

    #[tokio::test]
    async fn tools_call_divide_by_zero_returns_error() {
        let response = roundtrip(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {
                "name": "calculate",
                "arguments": { "operation": "divide", "a": 10, "b": 0 }
            }
        }))
        .await;

        assert_eq!(response["error"]["code"], -32603);
        assert_eq!(response["error"]["data"]["code"], "division_by_zero");
        let message = response["error"]["message"].as_str().unwrap_or_default();
        assert!(message.to_lowercase().contains("division by zero"));
    }

    #[tokio::test]
    async fn tools_call_unknown_tool_returns_error() {
        let response = roundtrip(json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": { "name": "nonexistent", "arguments": {} }
        }))
        .await;

        assert_eq!(response["error"]["code"], -32602);
        assert_eq!(response["error"]["message"], "Unknown tool: nonexistent");
        assert_eq!(response["error"]["data"]["code"], "unknown_capability");
    }

    #[tokio::test]
    async fn resources_list_and_read_manifest() {
        let response = roundtrip(json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "resources/list"
        }))
        .await;
        assert_eq!(response["result"]["resources"][0]["uri"], "file://server.json");
        assert_eq!(
            response["result"]["resources"][0]["mimeType"],
            "application/json"
        );

        let response = roundtrip(json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "resources/read",
            "params": { "uri": "file://server.json" }
        }))
        .await;
        let expected = std::fs::read_to_string("server.json").expect("manifest in crate root");
        assert_eq!(response["result"]["contents"][0]["text"], expected);
        assert_eq!(
            response["result"]["contents"][0]["mimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn unknown_method_returns_method_not_found() {
        let response =
            roundtrip(json!({ "jsonrpc": "2.0", "id": 8, "method": "prompts/list" })).await;
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["error"]["message"], "Method not found");
    }

    #[tokio::test]
    async fn notifications_produce_no_response() {
        let response = handle_json_rpc_value(
            &state(),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn non_object_payload_is_invalid_request() {
        let response = roundtrip(json!("tools/list")).await;
        assert_eq!(response["error"]["code"], -32600);
    }
}
