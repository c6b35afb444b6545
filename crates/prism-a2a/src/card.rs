//! Agent card derivation
//!
//! The card is the discovery half of the peer protocol: everything in it
//! comes from the agent's schema, so a schema change shows up in the card
//! without touching this module.

use prism_core::{PrismError, SchemaDoc, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CARD_VERSION: &str = "1.0";
pub const CARD_TYPE: &str = "agent_card";

/// Discovery document advertised to peer agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    pub version: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub agent: CardAgent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardAgent {
    pub name: String,
    pub description: String,
    pub version: String,
    pub capabilities: CardCapabilities,
    pub endpoints: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    pub metadata: Value,
}

/// What a peer can expect from this agent: chat is always on, `tools` is
/// the number of tools the schema declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCapabilities {
    pub chat: bool,
    pub tools: usize,
    pub memory: bool,
}

impl AgentCard {
    /// Derive the card from the agent schema. `prefix` is where the peer
    /// routes are mounted, so the advertised endpoint matches reality.
    pub fn derive(schema: &SchemaDoc, prefix: &str) -> Result<Self, PrismError> {
        schema.validate()?;

        let agent = CardAgent {
            name: schema.name.clone(),
            description: schema.description.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities: CardCapabilities {
                chat: true,
                tools: schema.tools.len(),
                memory: true,
            },
            endpoints: json!({
                "message": {
                    "url": format!("{prefix}/message"),
                    "method": "POST",
                    "schema": schema.input_schema,
                },
                "card": {
                    "url": format!("{prefix}/card"),
                    "method": "GET",
                },
            }),
            tools: schema.tools.clone(),
            metadata: json!({ "adapter": "prism-a2a" }),
        };

        Ok(Self {
            version: CARD_VERSION.to_string(),
            card_type: CARD_TYPE.to_string(),
            agent,
        })
    }
}
