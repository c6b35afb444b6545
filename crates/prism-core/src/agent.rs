//! The canonical agent contract
//!
//! Adapters depend on `dyn Agent`, never a concrete type. One implementation
//! serves every protocol; swapping agents means swapping one trait object at
//! startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::message::{AgentRequest, AgentResponse};
use crate::schema::SchemaDoc;

/// Errors an agent implementation may raise.
///
/// Adapters convert these to [`crate::PrismError::Agent`] at the dispatch
/// boundary; the message text is preserved verbatim for the caller.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AgentError {
    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("{0}")]
    Processing(String),
}

/// A conversational agent exposed through the gateway.
#[async_trait]
pub trait Agent: Send + Sync {
    /// One-time setup, called before any traffic is accepted. Loading
    /// models, opening clients, and similar work belongs here rather than
    /// in the first `process` call.
    async fn initialize(&self) -> Result<(), AgentError>;

    /// Handle one canonical request. The request message is guaranteed
    /// non-empty when it arrives through [`crate::dispatch`].
    async fn process(&self, request: AgentRequest) -> Result<AgentResponse, AgentError>;

    /// The schema document manifests are derived from. Called on every
    /// manifest request; implementations should return a fresh copy rather
    /// than require callers to cache it.
    fn get_schema(&self) -> SchemaDoc;
}

#[async_trait]
impl Agent for Box<dyn Agent> {
    async fn initialize(&self) -> Result<(), AgentError> {
        (**self).initialize().await
    }

    async fn process(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        (**self).process(request).await
    }

    fn get_schema(&self) -> SchemaDoc {
        (**self).get_schema()
    }
}
