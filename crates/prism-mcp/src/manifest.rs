//! MCP manifest derivation
//!
//! Pure projections of the agent's [`SchemaDoc`]. Exactly one tool is
//! exposed; its `inputSchema` is the schema document's input schema copied
//! verbatim, never rebuilt from the agent's internal tool list. Resource
//! content is computed at read time by the route handlers, not precomputed
//! here.

use prism_core::{PrismError, SchemaDoc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{McpResource, McpTool, ServerCapabilities, ServerInfo};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const CHAT_TOOL_NAME: &str = "chat";
pub const SCHEMA_RESOURCE_URI: &str = "agent://schema";
pub const CAPABILITIES_RESOURCE_URI: &str = "agent://capabilities";

/// The single tool descriptor derived from the agent schema.
pub fn chat_tool(schema: &SchemaDoc) -> Result<McpTool, PrismError> {
    schema.validate()?;
    Ok(McpTool {
        name: CHAT_TOOL_NAME.to_string(),
        description: format!("Chat with the {} agent", schema.name),
        input_schema: schema.input_schema.clone(),
    })
}

/// The two fixed resource descriptors.
pub fn resource_descriptors(schema: &SchemaDoc) -> Vec<McpResource> {
    vec![
        McpResource {
            uri: SCHEMA_RESOURCE_URI.to_string(),
            name: format!("{} Schema", schema.name),
            description: format!("Schema for the {} agent", schema.name),
            mime_type: "application/json".to_string(),
        },
        McpResource {
            uri: CAPABILITIES_RESOURCE_URI.to_string(),
            name: format!("{} Capabilities", schema.name),
            description: format!("Capability summary for the {} agent", schema.name),
            mime_type: "application/json".to_string(),
        },
    ]
}

/// Capability summary served by the `agent://capabilities` resource.
pub fn capabilities_summary(schema: &SchemaDoc) -> Value {
    json!({
        "name": schema.name,
        "description": schema.description,
        "capabilities": schema.capabilities,
        "tools": schema.tool_names(),
    })
}

/// The full manifest served by `GET /manifest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpManifest {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
    pub tools: Vec<McpTool>,
    pub resources: Vec<McpResource>,
}

impl McpManifest {
    pub fn derive(schema: &SchemaDoc) -> Result<Self, PrismError> {
        Ok(Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: format!("{}-mcp", schema.name),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: format!("MCP adapter for the {} agent", schema.name),
            },
            tools: vec![chat_tool(schema)?],
            resources: resource_descriptors(schema),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schema_with_input(input_schema: Value) -> SchemaDoc {
        SchemaDoc {
            name: "demo".into(),
            description: "demo agent".into(),
            input_schema,
            output_schema: json!({"type": "object"}),
            capabilities: vec!["chat".into()],
            tools: vec![],
        }
    }

    #[test]
    fn manifest_exposes_exactly_one_tool() {
        let schema = schema_with_input(json!({
            "type": "object",
            "properties": {"message": {"type": "string"}},
            "required": ["message"]
        }));
        let manifest = McpManifest::derive(&schema).unwrap();
        assert_eq!(manifest.tools.len(), 1);
        assert_eq!(manifest.tools[0].name, CHAT_TOOL_NAME);
        assert_eq!(manifest.tools[0].input_schema, schema.input_schema);
        assert_eq!(manifest.protocol_version, PROTOCOL_VERSION);
        assert_eq!(manifest.server_info.name, "demo-mcp");
    }

    #[test]
    fn derivation_fails_without_message_property() {
        let schema = schema_with_input(json!({"properties": {"text": {}}}));
        let err = McpManifest::derive(&schema).unwrap_err();
        assert_eq!(err.kind(), "schema_error");
    }

    #[test]
    fn resources_are_schema_and_capabilities() {
        let schema = schema_with_input(json!({"properties": {"message": {}}}));
        let uris: Vec<String> = resource_descriptors(&schema)
            .into_iter()
            .map(|res| res.uri)
            .collect();
        assert_eq!(uris, [SCHEMA_RESOURCE_URI, CAPABILITIES_RESOURCE_URI]);
    }

    #[test]
    fn capabilities_summary_lists_tool_names() {
        let mut schema = schema_with_input(json!({"properties": {"message": {}}}));
        schema.tools = vec![prism_core::ToolSpec {
            name: "calculate".into(),
            description: "calc".into(),
            input_schema: json!({}),
        }];
        let summary = capabilities_summary(&schema);
        assert_eq!(summary["tools"], json!(["calculate"]));
        assert_eq!(summary["name"], json!("demo"));
    }

    proptest! {
        // The exposed tool's input schema is always the schema document's
        // input schema, whatever extra properties it declares.
        #[test]
        fn tool_schema_round_trips(extra_keys in prop::collection::vec("[a-z]{1,10}", 0..6)) {
            let mut properties = serde_json::Map::new();
            properties.insert("message".into(), json!({"type": "string"}));
            for key in extra_keys {
                properties.insert(key, json!({"type": "string"}));
            }
            let schema = schema_with_input(json!({
                "type": "object",
                "properties": properties,
                "required": ["message"]
            }));

            let tool = chat_tool(&schema).unwrap();
            prop_assert_eq!(tool.input_schema, schema.input_schema);
        }
    }
}
