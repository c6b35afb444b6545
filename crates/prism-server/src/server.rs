//! Gateway assembly and startup
//!
//! Builds the adapter registry from configuration, merges host and adapter
//! routes under one CORS-wrapped router, and drives the listener. The
//! broker consumer runs beside the HTTP listener when the acp adapter is
//! enabled; a broker connection failure logs and leaves the HTTP surface
//! up rather than taking the whole gateway down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use prism_acp::AcpConsumer;
use prism_config::PrismConfig;
use prism_core::{Agent, SessionStore};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use crate::adapters::{A2aAdapter, AcpAdapter, McpAdapter, WebhookAdapter};
use crate::error::ServerError;
use crate::registry::AdapterRegistry;
use crate::routes::{self, GatewayState};

const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the registry holding all four protocol adapters, with enable
/// flags and mount prefixes resolved from configuration.
pub fn build_registry(
    config: &PrismConfig,
    agent: Arc<dyn Agent>,
    sessions: Arc<SessionStore>,
    http: reqwest::Client,
) -> Result<AdapterRegistry, ServerError> {
    let mut registry = AdapterRegistry::new(agent.clone());

    let mcp = config.adapters.mcp.resolve("mcp", "/mcp");
    registry.register(Arc::new(McpAdapter::new(
        mcp,
        prism_mcp::McpState::new(agent.clone(), sessions.clone()),
    )))?;

    let webhook = config.adapters.webhook.resolve("webhook", "/webhook");
    registry.register(Arc::new(WebhookAdapter::new(
        webhook,
        webhook_state(config, agent.clone(), sessions.clone(), http),
    )))?;

    let a2a = config.adapters.a2a.resolve("a2a", "/a2a");
    let a2a_state =
        prism_a2a::A2aState::new(agent.clone(), sessions.clone(), a2a.url_prefix.clone());
    registry.register(Arc::new(A2aAdapter::new(a2a, a2a_state)))?;

    let acp = config.adapters.acp.resolve("acp", "/acp");
    registry.register(Arc::new(AcpAdapter::new(acp, config.broker.subject.clone())))?;

    Ok(registry)
}

/// Attaches one outbound gateway per configured bot token. A platform
/// without a token still parses inbound payloads; its replies stay in the
/// HTTP ack body.
fn webhook_state(
    config: &PrismConfig,
    agent: Arc<dyn Agent>,
    sessions: Arc<SessionStore>,
    http: reqwest::Client,
) -> prism_webhook::WebhookState {
    let enabled = config.adapters.webhook.enabled;
    let mut state = prism_webhook::WebhookState::new(agent, sessions);

    if let Some(token) = &config.webhook.telegram_bot_token {
        state = state.with_gateway(Arc::new(prism_webhook::TelegramGateway::new(
            http.clone(),
            token.clone(),
        )));
    } else if enabled {
        warn!("telegram bot token not set; telegram replies stay in the http ack");
    }

    if let Some(token) = &config.webhook.slack_bot_token {
        state = state.with_gateway(Arc::new(prism_webhook::SlackGateway::new(
            http.clone(),
            token.clone(),
        )));
    } else if enabled {
        warn!("slack bot token not set; slack replies stay in the http ack");
    }

    if let Some(token) = &config.webhook.discord_bot_token {
        state = state.with_gateway(Arc::new(prism_webhook::DiscordGateway::new(
            http,
            token.clone(),
        )));
    } else if enabled {
        warn!("discord bot token not set; discord replies stay in the http ack");
    }

    state
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, ServerError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|origin| origin == "*") {
        warn!("cors is configured to allow every origin");
        return Ok(layer.allow_origin(AllowOrigin::any()));
    }

    let mut parsed = Vec::with_capacity(origins.len());
    for origin in origins {
        let value = origin
            .parse::<HeaderValue>()
            .map_err(|_| ServerError::Origin(origin.clone()))?;
        parsed.push(value);
    }
    Ok(layer.allow_origin(AllowOrigin::list(parsed)))
}

/// Merges host routes and every enabled adapter's routes into one router.
pub fn build_router(
    config: &PrismConfig,
    agent: Arc<dyn Agent>,
    sessions: Arc<SessionStore>,
    registry: Arc<AdapterRegistry>,
) -> Result<Router, ServerError> {
    let cors = cors_layer(&config.server.allowed_origins)?;
    let state = GatewayState::new(agent, sessions, registry.clone());
    Ok(routes::routes(state).merge(registry.router()).layer(cors))
}

/// Initializes the agent, assembles the gateway, and serves until the
/// listener stops.
pub async fn start_server(config: PrismConfig, agent: Arc<dyn Agent>) -> Result<(), ServerError> {
    agent.initialize().await?;

    let sessions = Arc::new(SessionStore::with_limit(config.session.history_limit));
    let http = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .map_err(|err| ServerError::HttpClient(err.to_string()))?;

    let registry = Arc::new(build_registry(
        &config,
        agent.clone(),
        sessions.clone(),
        http,
    )?);
    let router = build_router(&config, agent.clone(), sessions.clone(), registry.clone())?;

    if config.adapters.acp.enabled {
        spawn_broker_consumer(&config, agent, sessions);
    }

    let addr: SocketAddr = config
        .server
        .bind_addr()
        .parse()
        .map_err(|_| ServerError::Addr(config.server.bind_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        adapters = registry.enabled_count(),
        "gateway listening on http://{addr}"
    );
    axum::serve(listener, router).await?;
    Ok(())
}

fn spawn_broker_consumer(
    config: &PrismConfig,
    agent: Arc<dyn Agent>,
    sessions: Arc<SessionStore>,
) {
    let url = config.broker.url.clone();
    let subject = config.broker.subject.clone();
    let timeout = Duration::from_secs(config.broker.process_timeout_secs);

    tokio::spawn(async move {
        let consumer = Arc::new(AcpConsumer::new(agent, sessions, subject).with_timeout(timeout));
        match prism_acp::connect(&url).await {
            Ok(client) => {
                if let Err(err) = consumer.serve(client).await {
                    error!(error = %err, "broker consumer stopped");
                }
            }
            Err(err) => {
                error!(error = %err, url, "broker connection failed; broker surface inactive");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use prism_mock_agent::MockAgent;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn gateway(config: &PrismConfig) -> Router {
        let agent: Arc<dyn Agent> = Arc::new(MockAgent::echo());
        let sessions = Arc::new(SessionStore::with_limit(config.session.history_limit));
        let registry = Arc::new(
            build_registry(config, agent.clone(), sessions.clone(), reqwest::Client::new())
                .unwrap(),
        );
        build_router(config, agent, sessions, registry).unwrap()
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
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

    #[test]
    fn registry_holds_all_four_adapters() {
        let config = PrismConfig::default();
        let agent: Arc<dyn Agent> = Arc::new(MockAgent::echo());
        let registry = build_registry(
            &config,
            agent,
            Arc::new(SessionStore::new()),
            reqwest::Client::new(),
        )
        .unwrap();

        let names: Vec<String> = registry
            .descriptors()
            .into_iter()
            .map(|descriptor| descriptor.name)
            .collect();
        assert_eq!(names, ["mcp", "webhook", "a2a", "acp"]);
        assert_eq!(registry.enabled_count(), 4);
    }

    #[tokio::test]
    async fn full_router_serves_host_and_nested_routes() {
        let config = PrismConfig::default();
        let router = gateway(&config);

        let (status, body) = send(
            router.clone(),
            "POST",
            "/agent/chat",
            Some(json!({ "message": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "echo: hi");

        let (status, body) = send(router.clone(), "POST", "/mcp/tools/list", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["tools"][0]["name"], "chat");

        let (status, body) = send(router.clone(), "GET", "/a2a/card", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "agent_card");

        let (status, body) = send(router, "GET", "/webhook/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["adapter"], "webhook");
    }

    #[tokio::test]
    async fn disabled_adapter_prefix_is_not_mounted() {
        let mut config = PrismConfig::default();
        config.adapters.mcp.enabled = false;
        let router = gateway(&config);

        let (status, _) = send(router.clone(), "POST", "/mcp/tools/list", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(router, "GET", "/manifests", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("mcp").is_none());
        assert!(body.get("webhook").is_some());
    }

    #[tokio::test]
    async fn configured_prefix_override_moves_the_mount() {
        let mut config = PrismConfig::default();
        config.adapters.mcp.url_prefix = Some("/model-context".to_string());
        let router = gateway(&config);

        let (status, _) = send(router.clone(), "POST", "/mcp/tools/list", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(router, "POST", "/model-context/tools/list", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["tools"][0]["name"], "chat");
    }

    #[tokio::test]
    async fn cors_allows_a_configured_origin() {
        let config = PrismConfig::default();
        let router = gateway(&config);

        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some("http://localhost:3000")
        );
    }

    #[test]
    fn invalid_cors_origin_is_a_startup_error() {
        let mut config = PrismConfig::default();
        config.server.allowed_origins = vec!["bad\norigin".to_string()];
        let agent: Arc<dyn Agent> = Arc::new(MockAgent::echo());
        let sessions = Arc::new(SessionStore::new());
        let registry = Arc::new(
            build_registry(&config, agent.clone(), sessions.clone(), reqwest::Client::new())
                .unwrap(),
        );

        let err = build_router(&config, agent, sessions, registry).unwrap_err();
        assert!(matches!(err, ServerError::Origin(origin) if origin.contains("bad")));
    }
}
