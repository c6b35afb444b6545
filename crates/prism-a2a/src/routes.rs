//! Axum routes for the peer messaging surface

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use prism_core::{dispatch, Agent, AgentRequest, Metadata, PrismError, SessionStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::card::AgentCard;

/// Shared state for the peer routes.
///
/// `agent_id` identifies this instance to peers and stays stable for the
/// process lifetime.
#[derive(Clone)]
pub struct A2aState {
    pub agent: Arc<dyn Agent>,
    pub sessions: Arc<SessionStore>,
    pub prefix: String,
    agent_id: String,
}

impl A2aState {
    pub fn new(agent: Arc<dyn Agent>, sessions: Arc<SessionStore>, prefix: impl Into<String>) -> Self {
        let name = agent.get_schema().name;
        let nonce = Uuid::new_v4().simple().to_string();
        let agent_id = format!("{}-{}", name, &nonce[..8]);
        Self {
            agent,
            sessions,
            prefix: prefix.into(),
            agent_id,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }
}

/// Build the peer router. Mounted by the registry under the adapter prefix.
pub fn routes(state: A2aState) -> Router {
    Router::new()
        .route("/message", post(peer_message))
        .route("/card", get(card))
        .route("/status", get(status))
        .with_state(state)
}

/// Inbound message from another agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerMessage {
    pub sender_agent_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl PeerMessage {
    /// Convert into a canonical request tagged with the peer source and the
    /// sender's id, so the agent can tell which peer is talking.
    pub fn into_request(self) -> AgentRequest {
        let mut metadata = self.metadata;
        metadata.insert("source_protocol".to_string(), json!("peer"));
        metadata.insert("sender_agent_id".to_string(), json!(self.sender_agent_id));

        AgentRequest {
            message: self.message,
            session_id: self.session_id,
            metadata,
            tools: None,
        }
    }
}

async fn peer_message(
    State(state): State<A2aState>,
    Json(message): Json<PeerMessage>,
) -> Response {
    debug!(sender = %message.sender_agent_id, "peer message received");

    match dispatch(state.agent.as_ref(), &state.sessions, message.into_request()).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn card(State(state): State<A2aState>) -> Response {
    let schema = state.agent.get_schema();
    match AgentCard::derive(&schema, &state.prefix) {
        Ok(card) => (StatusCode::OK, Json(card)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn status(State(state): State<A2aState>) -> Json<Value> {
    Json(json!({
        "agent_id": state.agent_id,
        "status": "healthy",
        "active_sessions": state.sessions.len(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn error_response(err: &PrismError) -> Response {
    let status = match err {
        PrismError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = json!({ "error": { "kind": err.kind(), "message": err.detail() } });
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use prism_mock_agent::MockAgent;
    use tower::ServiceExt;

    fn test_state() -> (A2aState, Arc<MockAgent>) {
        let agent = Arc::new(MockAgent::echo());
        let state = A2aState::new(agent.clone(), Arc::new(SessionStore::new()), "/a2a");
        (state, agent)
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn peer_message_returns_the_response_directly() {
        let (state, _) = test_state();
        let sessions = state.sessions.clone();
        let body = json!({
            "senderAgentId": "scout-1",
            "message": "hi",
            "sessionId": "peer-7",
        });

        let (status, reply) = post_json(routes(state), "/message", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["message"], "echo: hi");
        assert_eq!(reply["session_id"], "peer-7");
        assert_eq!(sessions.get("peer-7").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_before_the_agent() {
        let (state, agent) = test_state();
        let body = json!({ "senderAgentId": "scout-1", "message": "" });
        let (status, reply) = post_json(routes(state), "/message", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["error"]["kind"], "validation_error");
        assert_eq!(agent.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_sender_id_fails_deserialization() {
        let (state, agent) = test_state();
        let (status, _) = post_json(routes(state), "/message", json!({ "message": "hi" })).await;

        assert!(status.is_client_error());
        assert_eq!(agent.call_count(), 0);
    }

    #[tokio::test]
    async fn agent_failure_surfaces_the_agent_message() {
        let agent = Arc::new(MockAgent::failing("tool backend offline"));
        let state = A2aState::new(agent, Arc::new(SessionStore::new()), "/a2a");
        let body = json!({ "senderAgentId": "scout-1", "message": "hi" });

        let (status, reply) = post_json(routes(state), "/message", body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply["error"]["kind"], "agent_error");
        assert_eq!(reply["error"]["message"], "tool backend offline");
    }

    #[tokio::test]
    async fn card_endpoint_serves_the_derived_card() {
        let (state, _) = test_state();
        let (status, card) = get_json(routes(state), "/card").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["type"], "agent_card");
        assert_eq!(card["agent"]["name"], "mock-agent");
        assert_eq!(card["agent"]["capabilities"]["tools"], 2);
        assert_eq!(card["agent"]["endpoints"]["message"]["url"], "/a2a/message");
    }

    #[tokio::test]
    async fn status_reports_the_instance_id() {
        let (state, _) = test_state();
        let agent_id = state.agent_id().to_string();
        let (status, body) = get_json(routes(state), "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["agent_id"], agent_id);
        assert_eq!(body["active_sessions"], 0);
    }

    #[test]
    fn into_request_tags_the_peer_source() {
        let message = PeerMessage {
            sender_agent_id: "scout-1".to_string(),
            message: "hi".to_string(),
            session_id: None,
            metadata: Metadata::new(),
        };

        let request = message.into_request();
        assert_eq!(request.metadata["source_protocol"], "peer");
        assert_eq!(request.metadata["sender_agent_id"], "scout-1");
    }

    #[test]
    fn instance_ids_are_unique_per_state() {
        let (a, _) = test_state();
        let (b, _) = test_state();
        assert_ne!(a.agent_id(), b.agent_id());
    }
}
