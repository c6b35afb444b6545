//! Axum routes for the webhook surface

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use prism_core::{dispatch, Agent, AgentResponse, Metadata, PrismError, SessionStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::gateway::PlatformGateway;
use crate::parse::{parse_platform, GenericWebhook};

/// Shared state for the webhook routes.
///
/// Gateways are keyed by platform name; a platform without a gateway still
/// accepts inbound traffic, its replies just stay in the HTTP body.
#[derive(Clone)]
pub struct WebhookState {
    pub agent: Arc<dyn Agent>,
    pub sessions: Arc<SessionStore>,
    gateways: HashMap<&'static str, Arc<dyn PlatformGateway>>,
}

impl WebhookState {
    pub fn new(agent: Arc<dyn Agent>, sessions: Arc<SessionStore>) -> Self {
        Self {
            agent,
            sessions,
            gateways: HashMap::new(),
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn PlatformGateway>) -> Self {
        self.gateways.insert(gateway.platform(), gateway);
        self
    }

    fn gateway(&self, platform: &str) -> Option<&dyn PlatformGateway> {
        self.gateways.get(platform).map(Arc::as_ref)
    }
}

/// Build the webhook router. Mounted by the registry under the adapter
/// prefix.
pub fn routes(state: WebhookState) -> Router {
    Router::new()
        .route("/", post(generic_webhook))
        .route("/telegram", post(telegram_webhook))
        .route("/slack", post(slack_webhook))
        .route("/discord", post(discord_webhook))
        .route("/health", get(health))
        .with_state(state)
}

/// Body returned to the inbound HTTP caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookReply {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl WebhookReply {
    fn from_response(
        response: AgentResponse,
        user_id: Option<String>,
        platform: Option<String>,
    ) -> Self {
        let mut metadata = response.metadata;
        metadata.insert("tools_used".to_string(), json!(response.tools_used));
        metadata.insert(
            "timestamp".to_string(),
            json!(response.timestamp.to_rfc3339()),
        );

        Self {
            message: response.message,
            user_id,
            session_id: response.session_id,
            platform,
            metadata,
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "adapter": "webhook" }))
}

async fn generic_webhook(
    State(state): State<WebhookState>,
    Json(payload): Json<GenericWebhook>,
) -> Response {
    let user_id = payload.user_id.clone();
    let platform = payload.platform.clone();

    match dispatch(state.agent.as_ref(), &state.sessions, payload.into_request()).await {
        Ok(response) => {
            let reply = WebhookReply::from_response(response, user_id, platform);
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(err @ PrismError::Validation(_)) => validation_response(&err),
        Err(err) => error_ack(err, user_id, None, platform),
    }
}

async fn telegram_webhook(
    State(state): State<WebhookState>,
    Json(payload): Json<Value>,
) -> Response {
    platform_webhook(state, "telegram", payload).await
}

async fn slack_webhook(State(state): State<WebhookState>, Json(payload): Json<Value>) -> Response {
    platform_webhook(state, "slack", payload).await
}

async fn discord_webhook(
    State(state): State<WebhookState>,
    Json(payload): Json<Value>,
) -> Response {
    platform_webhook(state, "discord", payload).await
}

async fn platform_webhook(state: WebhookState, platform: &'static str, payload: Value) -> Response {
    let parsed = match parse_platform(platform, &payload) {
        Ok(parsed) => parsed,
        Err(err) => return validation_response(&err),
    };
    debug!(platform, "webhook received");

    let user_id = parsed.user_id.clone();
    let target = parsed.chat_id.clone();

    match dispatch(state.agent.as_ref(), &state.sessions, parsed.into_request()).await {
        Ok(response) => {
            deliver_reply(&state, platform, target.as_deref(), &response.message).await;
            let reply = WebhookReply::from_response(response, user_id, Some(platform.to_string()));
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(err @ PrismError::Validation(_)) => validation_response(&err),
        Err(err) => error_ack(err, user_id, target, Some(platform.to_string())),
    }
}

async fn deliver_reply(state: &WebhookState, platform: &str, target: Option<&str>, text: &str) {
    let Some(gateway) = state.gateway(platform) else {
        debug!(platform, "no outbound gateway configured");
        return;
    };
    let Some(target) = target else {
        debug!(platform, "payload carried no delivery target");
        return;
    };

    // Failures are logged, never surfaced to the inbound caller.
    if let Err(err) = gateway.deliver(target, text).await {
        error!(platform, target, "outbound delivery failed: {err}");
    }
}

fn validation_response(err: &PrismError) -> Response {
    let body = json!({ "error": { "kind": err.kind(), "message": err.detail() } });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Agent failures ack with 200 and an error-shaped body. A non-2xx here
/// would make the platform redeliver the same update.
fn error_ack(
    err: PrismError,
    user_id: Option<String>,
    session_id: Option<String>,
    platform: Option<String>,
) -> Response {
    let mut metadata = Metadata::new();
    metadata.insert("error".to_string(), json!(err.detail()));
    metadata.insert("kind".to_string(), json!(err.kind()));

    let reply = WebhookReply {
        message: format!("Error processing request: {}", err.detail()),
        user_id,
        session_id,
        platform,
        metadata,
    };
    (StatusCode::OK, Json(reply)).into_response()
}
