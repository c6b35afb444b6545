//! Gateway error taxonomy
//!
//! Adapters convert every failure into one of these variants at the dispatch
//! boundary and render it in their own wire format. Each variant carries a
//! stable machine-readable kind alongside the human-readable message.

use serde::{Deserialize, Serialize};

/// Result type for gateway operations
pub type PrismResult<T> = Result<T, PrismError>;

/// Errors produced while translating between a wire protocol and the agent
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PrismError {
    /// Malformed or missing client input. Client-caused, never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// A manifest could not be derived from the agent schema. Fatal at
    /// startup: traffic must not be accepted while this holds.
    #[error("schema error: {0}")]
    Schema(String),

    /// A tool name was requested that the manifest does not expose.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// A resource URI was requested that the manifest does not expose.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// The wrapped agent failed while processing. The agent's own message
    /// is preserved verbatim and surfaced to the caller.
    #[error("agent processing error: {0}")]
    Agent(String),

    /// An outbound push to a platform or broker failed. Logged by the
    /// caller, never propagated into the inbound acknowledgment.
    #[error("delivery error: {0}")]
    Delivery(String),
}

impl PrismError {
    /// Stable identifier for the error kind, used in wire-level error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Schema(_) => "schema_error",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::ResourceNotFound(_) => "resource_not_found",
            Self::Agent(_) => "agent_error",
            Self::Delivery(_) => "delivery_error",
        }
    }

    /// The message without the kind prefix added by `Display`.
    pub fn detail(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::Schema(msg)
            | Self::ToolNotFound(msg)
            | Self::ResourceNotFound(msg)
            | Self::Agent(msg)
            | Self::Delivery(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_stable_per_variant() {
        assert_eq!(PrismError::Validation("x".into()).kind(), "validation_error");
        assert_eq!(PrismError::ToolNotFound("foo".into()).kind(), "tool_not_found");
        assert_eq!(PrismError::Delivery("x".into()).kind(), "delivery_error");
    }

    #[test]
    fn detail_strips_display_prefix() {
        let err = PrismError::Agent("model unavailable".into());
        assert_eq!(err.detail(), "model unavailable");
        assert_eq!(err.to_string(), "agent processing error: model unavailable");
    }
}
