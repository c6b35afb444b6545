//! The single dispatch path from adapters to the agent
//!
//! Every adapter funnels through [`dispatch`] after parsing its wire
//! payload. Centralizing the call enforces two invariants that otherwise
//! would have to be re-implemented per protocol: the agent never sees an
//! empty message, and session history is recorded in exactly one place.

use tracing::debug;

use crate::agent::Agent;
use crate::error::PrismError;
use crate::message::{AgentRequest, AgentResponse};
use crate::session::{Exchange, SessionStore};

/// Validates the request, records history, and invokes the agent.
///
/// The user's message is appended to the session before processing and the
/// agent's reply after, both under the request's session key. Requests
/// without a session key dispatch statelessly and leave the store untouched.
pub async fn dispatch(
    agent: &dyn Agent,
    sessions: &SessionStore,
    request: AgentRequest,
) -> Result<AgentResponse, PrismError> {
    request.validate()?;

    let session_key = request.session_id.clone();
    if let Some(key) = &session_key {
        sessions.append(key, Exchange::user(&request.message));
    }

    debug!(
        session_id = session_key.as_deref().unwrap_or("-"),
        "dispatching request to agent"
    );

    let response = agent
        .process(request)
        .await
        .map_err(|err| PrismError::Agent(err.to_string()))?;

    if let Some(key) = &session_key {
        sessions.append(key, Exchange::agent(&response.message));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentError;
    use crate::schema::SchemaDoc;
    use crate::session::Role;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAgent {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingAgent {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl Agent for CountingAgent {
        async fn initialize(&self) -> Result<(), AgentError> {
            Ok(())
        }

        async fn process(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AgentError::Processing("model unavailable".into()));
            }
            Ok(AgentResponse::new(format!("echo: {}", request.message))
                .with_session(request.session_id))
        }

        fn get_schema(&self) -> SchemaDoc {
            SchemaDoc {
                name: "counting".into(),
                description: "test".into(),
                input_schema: json!({"properties": {"message": {"type": "string"}}}),
                output_schema: json!({}),
                capabilities: vec![],
                tools: vec![],
            }
        }
    }

    #[tokio::test]
    async fn empty_message_never_reaches_agent() {
        let agent = CountingAgent::new(false);
        let sessions = SessionStore::new();

        let err = dispatch(&agent, &sessions, AgentRequest::new("  "))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn records_both_sides_of_a_turn() {
        let agent = CountingAgent::new(false);
        let sessions = SessionStore::new();

        let request = AgentRequest::new("hi").with_session("s1");
        let response = dispatch(&agent, &sessions, request).await.unwrap();
        assert_eq!(response.message, "echo: hi");
        assert_eq!(response.session_id.as_deref(), Some("s1"));

        let history = sessions.get("s1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "hi");
        assert_eq!(history[1].role, Role::Agent);
        assert_eq!(history[1].text, "echo: hi");
    }

    #[tokio::test]
    async fn sessionless_dispatch_leaves_store_untouched() {
        let agent = CountingAgent::new(false);
        let sessions = SessionStore::new();

        dispatch(&agent, &sessions, AgentRequest::new("hi"))
            .await
            .unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn agent_failure_preserves_message() {
        let agent = CountingAgent::new(true);
        let sessions = SessionStore::new();

        let err = dispatch(&agent, &sessions, AgentRequest::new("hi").with_session("s1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "agent_error");
        assert_eq!(err.detail(), "model unavailable");

        // The user's message is kept; no agent reply is recorded.
        let history = sessions.get("s1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
    }
}
