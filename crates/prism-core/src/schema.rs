//! Agent schema document
//!
//! One `SchemaDoc` describes the agent's interface; every protocol manifest
//! is a pure projection of it. The document is immutable after the agent
//! initializes, but manifest builders still re-read it per request so a
//! swapped-in agent is picked up without restarting adapters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PrismError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDoc {
    /// Agent name, used to derive server identities in manifests.
    pub name: String,
    pub description: String,

    /// JSON-Schema-like description of the canonical request.
    pub input_schema: Value,

    /// JSON-Schema-like description of the canonical response.
    pub output_schema: Value,

    /// Free-form capability labels advertised in discovery documents.
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Tools the agent can use internally. Listed in discovery cards only;
    /// no protocol exposes them as separately callable surface.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

/// Descriptor for one internal agent tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub input_schema: Value,
}

impl SchemaDoc {
    /// Checks that manifests can be derived from this document.
    ///
    /// Every protocol projection assumes the input schema declares a
    /// `message` property; a document without one fails here, at startup,
    /// rather than at the first manifest request.
    pub fn validate(&self) -> Result<(), PrismError> {
        let has_message = self
            .input_schema
            .get("properties")
            .and_then(|props| props.get("message"))
            .is_some();
        if !has_message {
            return Err(PrismError::Schema(format!(
                "input schema for agent '{}' declares no 'message' property",
                self.name
            )));
        }
        Ok(())
    }

    /// Names of the agent's internal tools, for capability summaries.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(input_schema: Value) -> SchemaDoc {
        SchemaDoc {
            name: "test-agent".into(),
            description: "test".into(),
            input_schema,
            output_schema: json!({"type": "object"}),
            capabilities: vec!["chat".into()],
            tools: Vec::new(),
        }
    }

    #[test]
    fn accepts_schema_with_message_property() {
        let schema = doc(json!({
            "type": "object",
            "properties": {"message": {"type": "string"}},
            "required": ["message"]
        }));
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn rejects_schema_without_message_property() {
        let schema = doc(json!({
            "type": "object",
            "properties": {"text": {"type": "string"}}
        }));
        let err = schema.validate().unwrap_err();
        assert_eq!(err.kind(), "schema_error");
    }

    #[test]
    fn rejects_schema_without_properties() {
        let schema = doc(json!({"type": "object"}));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn tool_names_lists_internal_tools() {
        let mut schema = doc(json!({"properties": {"message": {"type": "string"}}}));
        schema.tools = vec![
            ToolSpec {
                name: "get_current_time".into(),
                description: "Get the current time".into(),
                input_schema: json!({"type": "object", "properties": {}}),
            },
            ToolSpec {
                name: "calculate".into(),
                description: "Evaluate an expression".into(),
                input_schema: json!({"type": "object"}),
            },
        ];
        assert_eq!(schema.tool_names(), ["get_current_time", "calculate"]);
    }

    #[test]
    fn tools_field_optional_on_the_wire() {
        let schema = doc(json!({"properties": {"message": {"type": "string"}}}));
        let wire = serde_json::to_value(&schema).unwrap();
        assert!(!wire.as_object().unwrap().contains_key("tools"));
    }
}
