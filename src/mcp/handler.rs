//! MCP HTTP Handler
//!
//! Every POST carries one JSON-RPC envelope. The body is parsed here rather
//! than by an axum extractor so that malformed input still gets an error
//! envelope, always with HTTP 200.

use axum::{body::Bytes, extract::State, Json};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use super::context::ToolContext;
use super::protocol::{
    methods, McpError, McpRequest, McpResponse, RequestId, ResourcesListResult,
    ResourcesReadParams, ResourcesReadResult, ToolsCallParams, ToolsListResult, JSONRPC_VERSION,
};
use super::resources::Resource;
use super::tools::Tool;

pub async fn mcp_handler(State(ctx): State<ToolContext>, body: Bytes) -> Json<McpResponse> {
    Json(handle_message(&ctx, &body).await)
}

/// Handle a single MCP message
pub async fn handle_message(ctx: &ToolContext, body: &[u8]) -> McpResponse {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            debug!("Rejecting unparseable MCP body: {}", e);
            return McpResponse::error(None, McpError::ParseError(e.to_string()));
        }
    };

    if !value.is_object() {
        return McpResponse::error(
            None,
            McpError::InvalidRequest("expected a JSON object".to_string()),
        );
    }
    let request_id = extract_request_id(&value);

    let request: McpRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return McpResponse::error(request_id, McpError::InvalidRequest(e.to_string()));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return McpResponse::error(
            request.id,
            McpError::InvalidRequest(format!("unsupported jsonrpc version '{}'", request.jsonrpc)),
        );
    }

    let result = match request.method.as_str() {
        methods::TOOLS_LIST => handle_tools_list(),
        methods::TOOLS_CALL => handle_tools_call(ctx, request.params).await,
        methods::RESOURCES_LIST => handle_resources_list(),
        methods::RESOURCES_READ => handle_resources_read(ctx, request.params).await,
        other => Err(McpError::MethodNotFound(other.to_string())),
    };

    match result {
        Ok(value) => McpResponse::success(request.id, value),
        Err(error) => {
            match &error {
                McpError::Upstream(message) => {
                    error!(method = %request.method, "Upstream failure: {}", message)
                }
                McpError::InternalError(message) => {
                    error!(method = %request.method, "Internal error: {}", message)
                }
                other => debug!(method = %request.method, "MCP request rejected: {}", other),
            }
            McpResponse::error(request.id, error)
        }
    }
}

/// Best-effort id recovery so that invalid requests can still be correlated.
fn extract_request_id(value: &Value) -> Option<RequestId> {
    value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok())
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    match params {
        None => Err(McpError::InvalidParams("Missing params".to_string())),
        Some(params @ Value::Object(_)) => {
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
        }
        Some(_) => Err(McpError::InvalidParams("params must be an object".to_string())),
    }
}

fn to_value<T: serde::Serialize>(result: T) -> Result<Value, McpError> {
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_tools_list() -> Result<Value, McpError> {
    to_value(ToolsListResult {
        tools: Tool::definitions(),
    })
}

async fn handle_tools_call(ctx: &ToolContext, params: Option<Value>) -> Result<Value, McpError> {
    let params: ToolsCallParams = parse_params(params)?;

    let tool = Tool::from_name(&params.name)
        .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", params.name)))?;

    let arguments = match params.arguments {
        None | Some(Value::Null) => json!({}),
        Some(arguments) => arguments,
    };
    debug!(tool = tool.name(), "Calling tool");
    let result = tool.call(ctx, arguments).await?;
    if result.is_error() {
        warn!(tool = tool.name(), "Tool returned an error result");
    }

    to_value(result)
}

fn handle_resources_list() -> Result<Value, McpError> {
    to_value(ResourcesListResult {
        resources: Resource::definitions(),
    })
}

async fn handle_resources_read(
    ctx: &ToolContext,
    params: Option<Value>,
) -> Result<Value, McpError> {
    let params: ResourcesReadParams = parse_params(params)?;

    let resource = Resource::from_uri(&params.uri)
        .ok_or_else(|| McpError::ResourceNotFound(params.uri.clone()))?;

    let contents = resource.read(ctx).await?;

    to_value(ResourcesReadResult { contents })
}
