//! MCP adapter
//!
//! Exposes the agent to Model Context Protocol clients as exactly one tool
//! (`chat`) plus two readable resources (`agent://schema`,
//! `agent://capabilities`). The tool's input schema is the agent's own input
//! schema, copied verbatim at derivation time; the agent's internal tools
//! are never exposed as separate MCP tools.
//!
//! Routes (mounted under the adapter's prefix):
//!
//! - `POST /tools/list`
//! - `POST /tools/call`
//! - `POST /resources/list`
//! - `POST /resources/read`
//! - `GET  /manifest`

pub mod manifest;
pub mod routes;
pub mod types;

pub use manifest::{
    capabilities_summary, chat_tool, resource_descriptors, McpManifest, CAPABILITIES_RESOURCE_URI,
    CHAT_TOOL_NAME, PROTOCOL_VERSION, SCHEMA_RESOURCE_URI,
};
pub use routes::{routes, McpState};
pub use types::{
    CallToolRequest, JsonRpcError, McpContent, McpEnvelope, McpResource, McpTool,
    ReadResourceRequest, ResourceContents,
};
