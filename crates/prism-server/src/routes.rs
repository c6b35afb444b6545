//! Host routes
//!
//! The surface the server owns directly, outside any adapter prefix: the
//! 1:1 REST/chat endpoint, the agent schema, the aggregate manifests, and
//! the service/health/adapter listings.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use prism_core::{dispatch, Agent, AgentRequest, AgentResponse, PrismError, SchemaDoc, SessionStore};
use serde_json::{json, Value};
use tracing::warn;

use crate::registry::AdapterRegistry;

/// Shared state for the host routes.
#[derive(Clone)]
pub struct GatewayState {
    pub agent: Arc<dyn Agent>,
    pub sessions: Arc<SessionStore>,
    pub registry: Arc<AdapterRegistry>,
}

impl GatewayState {
    pub fn new(
        agent: Arc<dyn Agent>,
        sessions: Arc<SessionStore>,
        registry: Arc<AdapterRegistry>,
    ) -> Self {
        Self {
            agent,
            sessions,
            registry,
        }
    }
}

pub fn routes(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/manifests", get(manifests))
        .route("/adapters", get(list_adapters))
        .route("/agent/chat", post(agent_chat))
        .route("/agent/schema", get(agent_schema))
        .with_state(state)
}

/// `POST /agent/chat`. The body is the canonical request itself; the reply
/// is the canonical response, no protocol framing in between.
async fn agent_chat(
    State(state): State<GatewayState>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, (StatusCode, Json<Value>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("chat request body rejected: {}", rejection.body_text());
        (
            rejection.status(),
            Json(json!({
                "error": { "kind": "validation_error", "message": rejection.body_text() }
            })),
        )
    })?;

    dispatch(state.agent.as_ref(), &state.sessions, request)
        .await
        .map(Json)
        .map_err(error_response)
}

/// `GET /agent/schema`. Read from the agent on every call.
async fn agent_schema(State(state): State<GatewayState>) -> Json<SchemaDoc> {
    Json(state.agent.get_schema())
}

/// `GET /manifests`. One entry per enabled adapter, re-derived per request.
async fn manifests(
    State(state): State<GatewayState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .registry
        .manifests()
        .map(|manifests| Json(Value::Object(manifests)))
        .map_err(error_response)
}

async fn service_info(State(state): State<GatewayState>) -> Json<Value> {
    let schema = state.agent.get_schema();
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "status": "running",
        "agent": schema.name,
        "adapters": state.registry.enabled_names(),
        "endpoints": {
            "chat": "/agent/chat",
            "schema": "/agent/schema",
            "manifests": "/manifests",
            "adapters": "/adapters",
            "health": "/health",
        },
    }))
}

async fn health(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "agent": state.agent.get_schema().name,
        "adapters": state.registry.enabled_count(),
    }))
}

async fn list_adapters(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({ "adapters": state.registry.descriptors() }))
}

fn error_response(err: PrismError) -> (StatusCode, Json<Value>) {
    warn!(kind = err.kind(), "host request failed: {err}");
    let status = match &err {
        PrismError::Validation(_) => StatusCode::BAD_REQUEST,
        PrismError::ToolNotFound(_) | PrismError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({ "error": { "kind": err.kind(), "message": err.detail() } })),
    )
}
