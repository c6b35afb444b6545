//! Axum routes for the MCP surface
//!
//! Every handler wraps its outcome in [`McpEnvelope`], echoing the caller's
//! request id when one was sent. Errors carry both an HTTP status and a
//! JSON-RPC error object so strict and lenient clients can key off either.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use prism_core::{dispatch, Agent, AgentRequest, PrismError, SessionStore};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::manifest::{
    capabilities_summary, chat_tool, resource_descriptors, McpManifest, CAPABILITIES_RESOURCE_URI,
    CHAT_TOOL_NAME, SCHEMA_RESOURCE_URI,
};
use crate::types::{
    CallToolRequest, JsonRpcError, McpContent, McpEnvelope, ReadResourceRequest, ResourceContents,
    INTERNAL_ERROR, INVALID_PARAMS, RESOURCE_NOT_FOUND,
};

/// Shared state for the MCP routes.
#[derive(Clone)]
pub struct McpState {
    pub agent: Arc<dyn Agent>,
    pub sessions: Arc<SessionStore>,
}

impl McpState {
    pub fn new(agent: Arc<dyn Agent>, sessions: Arc<SessionStore>) -> Self {
        Self { agent, sessions }
    }
}

/// Build the MCP router. Mounted by the registry under the adapter prefix.
pub fn routes(state: McpState) -> Router {
    Router::new()
        .route("/tools/list", post(list_tools))
        .route("/tools/call", post(call_tool))
        .route("/resources/list", post(list_resources))
        .route("/resources/read", post(read_resource))
        .route("/manifest", get(manifest))
        .with_state(state)
}

async fn list_tools(State(state): State<McpState>) -> (StatusCode, Json<McpEnvelope>) {
    let schema = state.agent.get_schema();
    match chat_tool(&schema) {
        Ok(tool) => envelope_ok(json!({ "tools": [tool] }), None),
        Err(err) => envelope_err(&err, None),
    }
}

async fn call_tool(
    State(state): State<McpState>,
    Json(body): Json<CallToolRequest>,
) -> (StatusCode, Json<McpEnvelope>) {
    let id = body.id.clone();
    debug!(tool = %body.name, "mcp tools/call");
    match handle_call(&state, body).await {
        Ok(result) => envelope_ok(result, id),
        Err(err) => envelope_err(&err, id),
    }
}

async fn handle_call(state: &McpState, body: CallToolRequest) -> Result<Value, PrismError> {
    if body.name != CHAT_TOOL_NAME {
        return Err(PrismError::ToolNotFound(format!(
            "unknown tool '{}', only '{CHAT_TOOL_NAME}' is available",
            body.name
        )));
    }

    let request = request_from_arguments(body.arguments)?;
    let response = dispatch(state.agent.as_ref(), &state.sessions, request).await?;

    Ok(json!({
        "content": [McpContent::text(response.message)],
        "metadata": {
            "session_id": response.session_id,
            "tools_used": response.tools_used,
            "timestamp": response.timestamp.to_rfc3339(),
        },
    }))
}

/// Translate `tools/call` arguments into an agent request.
///
/// Accepts both `sessionId` and `session_id` spellings; message validation
/// itself happens in [`dispatch`] so all adapters reject the same way.
fn request_from_arguments(arguments: Value) -> Result<AgentRequest, PrismError> {
    let args = match arguments {
        Value::Null => serde_json::Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(PrismError::Validation(format!(
                "tool arguments must be an object, got {}",
                json_type_name(&other)
            )));
        }
    };

    let message = args
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let session_id = args
        .get("sessionId")
        .or_else(|| args.get("session_id"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    let metadata = args
        .get("metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let tools = args.get("tools").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect()
    });

    Ok(AgentRequest {
        message,
        session_id,
        metadata,
        tools,
    })
}

async fn list_resources(State(state): State<McpState>) -> (StatusCode, Json<McpEnvelope>) {
    let schema = state.agent.get_schema();
    envelope_ok(json!({ "resources": resource_descriptors(&schema) }), None)
}

async fn read_resource(
    State(state): State<McpState>,
    Json(body): Json<ReadResourceRequest>,
) -> (StatusCode, Json<McpEnvelope>) {
    let id = body.id.clone();
    match handle_read(&state, &body.uri) {
        Ok(result) => envelope_ok(result, id),
        Err(err) => envelope_err(&err, id),
    }
}

fn handle_read(state: &McpState, uri: &str) -> Result<Value, PrismError> {
    // Re-derived from the live schema on every read, never cached.
    let schema = state.agent.get_schema();
    let text = match uri {
        SCHEMA_RESOURCE_URI => {
            let doc = serde_json::to_value(&schema)
                .map_err(|err| PrismError::Schema(err.to_string()))?;
            pretty(&doc)
        }
        CAPABILITIES_RESOURCE_URI => pretty(&capabilities_summary(&schema)),
        other => {
            return Err(PrismError::ResourceNotFound(format!(
                "unknown resource '{other}'"
            )));
        }
    };

    Ok(json!({
        "contents": [ResourceContents {
            uri: uri.to_string(),
            mime_type: "application/json".to_string(),
            text,
        }],
    }))
}

async fn manifest(
    State(state): State<McpState>,
) -> Result<Json<McpManifest>, (StatusCode, Json<McpEnvelope>)> {
    let schema = state.agent.get_schema();
    match McpManifest::derive(&schema) {
        Ok(manifest) => Ok(Json(manifest)),
        Err(err) => Err(envelope_err(&err, None)),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn envelope_ok(result: Value, id: Option<Value>) -> (StatusCode, Json<McpEnvelope>) {
    (StatusCode::OK, Json(McpEnvelope::result(result, id)))
}

fn envelope_err(err: &PrismError, id: Option<Value>) -> (StatusCode, Json<McpEnvelope>) {
    warn!(kind = err.kind(), "mcp request failed: {err}");
    let (status, code) = match err {
        PrismError::Validation(_) | PrismError::ToolNotFound(_) => {
            (StatusCode::BAD_REQUEST, INVALID_PARAMS)
        }
        PrismError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, RESOURCE_NOT_FOUND),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR),
    };
    let error = JsonRpcError {
        code,
        message: err.detail().to_string(),
        data: Some(json!({ "kind": err.kind() })),
    };
    (status, Json(McpEnvelope::error(error, id)))
}
