//! ACP manifest derivation

use prism_core::{PrismError, SchemaDoc, ToolSpec};
use serde::{Deserialize, Serialize};

pub const ACP_PROTOCOL: &str = "acp";
pub const ACP_VERSION: &str = "1.0";

/// Manifest advertised for the broker surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcpManifest {
    pub version: String,
    pub protocol: String,
    pub agent: AcpAgentInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcpAgentInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub queue: QueueInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

/// Where to send requests and what to expect back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub subject: String,
    pub reply: String,
}

impl AcpManifest {
    /// Derive the manifest from the agent schema and the configured inbound
    /// subject.
    pub fn derive(schema: &SchemaDoc, subject: &str) -> Result<Self, PrismError> {
        schema.validate()?;

        Ok(Self {
            version: ACP_VERSION.to_string(),
            protocol: ACP_PROTOCOL.to_string(),
            agent: AcpAgentInfo {
                id: schema.name.clone(),
                name: schema.name.clone(),
                description: schema.description.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                capabilities: vec![
                    "text_generation".to_string(),
                    "tool_use".to_string(),
                    "conversation".to_string(),
                ],
                queue: QueueInfo {
                    subject: subject.to_string(),
                    reply: "per-request replyTo, correlationId echoed".to_string(),
                },
                tools: schema.tools.clone(),
            },
        })
    }
}
