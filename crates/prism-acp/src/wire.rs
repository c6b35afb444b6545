//! Broker wire types
//!
//! Payloads are JSON with camelCase keys. An inbound request may name its
//! reply target in the body (`replyTo`) or rely on the broker-level reply
//! subject; the broker-level one wins when both are present.

use chrono::{DateTime, Utc};
use prism_core::{AgentRequest, AgentResponse, Metadata, PrismError};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Inbound queue message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl BrokerRequest {
    /// Convert into a canonical request. `correlation_id` is the final id
    /// (assigned by the consumer when the sender omitted one) and rides
    /// along in metadata so the agent can log it.
    pub fn into_request(self, correlation_id: &str) -> AgentRequest {
        let mut metadata = self.metadata;
        metadata.insert("source_protocol".to_string(), json!("broker"));
        metadata.insert("correlation_id".to_string(), json!(correlation_id));
        if let Some(sender) = &self.sender_agent_id {
            metadata.insert("sender_agent_id".to_string(), json!(sender));
        }

        AgentRequest {
            message: self.message,
            session_id: self.session_id,
            metadata,
            tools: None,
        }
    }
}

/// Reply published to the request's reply target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerReply {
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

/// Error details carried by an error-shaped reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyError {
    pub kind: String,
    pub message: String,
}

impl BrokerReply {
    pub fn success(correlation_id: String, response: AgentResponse) -> Self {
        Self {
            correlation_id,
            session_id: response.session_id,
            message: response.message,
            metadata: response.metadata,
            tools_used: response.tools_used,
            timestamp: response.timestamp,
            error: None,
        }
    }

    pub fn failure(
        correlation_id: String,
        session_id: Option<String>,
        err: &PrismError,
    ) -> Self {
        Self {
            correlation_id,
            session_id,
            message: format!("Error processing request: {}", err.detail()),
            metadata: Metadata::new(),
            tools_used: Vec::new(),
            timestamp: Utc::now(),
            error: Some(ReplyError {
                kind: err.kind().to_string(),
                message: err.detail().to_string(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
