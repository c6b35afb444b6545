//! Registry bindings for the protocol adapter crates
//!
//! Each binding pairs an [`AdapterConfig`] with the adapter crate's state
//! and answers the registry's three questions: who are you, what is your
//! manifest for a given schema, and what routes do you mount.

use axum::Router;
use prism_core::{AdapterConfig, PrismError, SchemaDoc};
use serde::Serialize;
use serde_json::Value;

use crate::registry::ProtocolAdapter;

fn to_manifest_value<T: Serialize>(manifest: T) -> Result<Value, PrismError> {
    serde_json::to_value(manifest).map_err(|err| PrismError::Schema(err.to_string()))
}

/// MCP surface: one chat tool, two resources, a manifest endpoint.
pub struct McpAdapter {
    config: AdapterConfig,
    state: prism_mcp::McpState,
}

impl McpAdapter {
    pub fn new(config: AdapterConfig, state: prism_mcp::McpState) -> Self {
        Self { config, state }
    }
}

impl ProtocolAdapter for McpAdapter {
    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn manifest(&self, schema: &SchemaDoc) -> Result<Value, PrismError> {
        to_manifest_value(prism_mcp::McpManifest::derive(schema)?)
    }

    fn routes(&self) -> Option<Router> {
        Some(prism_mcp::routes(self.state.clone()))
    }
}

/// Platform webhook surface: inbound parsers plus outbound gateways.
pub struct WebhookAdapter {
    config: AdapterConfig,
    state: prism_webhook::WebhookState,
}

impl WebhookAdapter {
    pub fn new(config: AdapterConfig, state: prism_webhook::WebhookState) -> Self {
        Self { config, state }
    }
}

impl ProtocolAdapter for WebhookAdapter {
    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn manifest(&self, schema: &SchemaDoc) -> Result<Value, PrismError> {
        to_manifest_value(prism_webhook::WebhookManifest::derive(
            schema,
            &self.config.url_prefix,
        )?)
    }

    fn routes(&self) -> Option<Router> {
        Some(prism_webhook::routes(self.state.clone()))
    }
}

/// Peer messaging surface: the synchronous message endpoint and its card.
pub struct A2aAdapter {
    config: AdapterConfig,
    state: prism_a2a::A2aState,
}

impl A2aAdapter {
    pub fn new(config: AdapterConfig, state: prism_a2a::A2aState) -> Self {
        Self { config, state }
    }
}

impl ProtocolAdapter for A2aAdapter {
    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn manifest(&self, schema: &SchemaDoc) -> Result<Value, PrismError> {
        to_manifest_value(prism_a2a::AgentCard::derive(schema, &self.config.url_prefix)?)
    }

    fn routes(&self) -> Option<Router> {
        Some(prism_a2a::routes(self.state.clone()))
    }
}

/// Broker messaging surface. Traffic arrives over NATS, not HTTP, so this
/// binding only contributes a manifest; the consumer loop is spawned by the
/// server alongside the listener.
pub struct AcpAdapter {
    config: AdapterConfig,
    subject: String,
}

impl AcpAdapter {
    pub fn new(config: AdapterConfig, subject: impl Into<String>) -> Self {
        Self {
            config,
            subject: subject.into(),
        }
    }
}

impl ProtocolAdapter for AcpAdapter {
    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn manifest(&self, schema: &SchemaDoc) -> Result<Value, PrismError> {
        to_manifest_value(prism_acp::AcpManifest::derive(schema, &self.subject)?)
    }

    fn routes(&self) -> Option<Router> {
        None
    }
}
