//! Canonical request and response types
//!
//! Every inbound wire payload is parsed into an [`AgentRequest`] and every
//! outbound payload is serialized from an [`AgentResponse`]. Metadata is an
//! ordered string-keyed map; adapters copy it through opaquely apart from
//! the well-known keys they read themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PrismError;

/// Ordered metadata bag attached to requests and responses.
///
/// Insertion order survives serialization (`serde_json` is built with
/// `preserve_order`), so adapters can rely on stable key ordering in wire
/// output.
pub type Metadata = serde_json::Map<String, Value>;

/// The canonical inbound message shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    /// User message text. Must be non-empty by the time it reaches the agent.
    pub message: String,

    /// Conversation key for multi-turn continuity. Absent for one-shot calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Protocol-specific context carried through to the agent untouched.
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,

    /// Names of tools the caller wants the agent restricted to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

impl AgentRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            metadata: Metadata::new(),
            tools: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Rejects messages that are empty after trimming. Called by the
    /// dispatch path before the agent ever sees the request.
    pub fn validate(&self) -> Result<(), PrismError> {
        if self.message.trim().is_empty() {
            return Err(PrismError::Validation("message must not be empty".into()));
        }
        Ok(())
    }
}

/// The canonical outbound message shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Agent reply text.
    pub message: String,

    /// Echo of the request's session key, when one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,

    /// Tools the agent actually invoked while producing this reply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,

    /// Set when the response is constructed, not when it is serialized.
    pub timestamp: DateTime<Utc>,
}

impl AgentResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            metadata: Metadata::new(),
            tools_used: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_tools_used(mut self, tools: Vec<String>) -> Self {
        self.tools_used = tools;
        self
    }
}
