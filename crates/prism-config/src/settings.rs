//! Gateway settings
//!
//! Plain serde structs with per-field defaults, in three layers: built-in
//! defaults, an optional TOML file, then environment overrides. Platform
//! tokens are only ever read from the environment or the file; they are not
//! logged.

use std::env;
use std::path::Path;

use prism_core::AdapterConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Root configuration for the gateway binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub adapters: AdaptersConfig,
    pub webhook: WebhookTokens,
    pub broker: BrokerConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the CORS layer.
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_origins(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum exchanges retained per session before FIFO eviction.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

/// Enable flags and mount prefixes for the protocol adapters. The REST
/// surface is part of the host server and is always on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptersConfig {
    pub mcp: AdapterSection,
    pub webhook: AdapterSection,
    pub a2a: AdapterSection,
    pub acp: AdapterSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Overrides the adapter's default mount prefix.
    #[serde(default)]
    pub url_prefix: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for AdapterSection {
    fn default() -> Self {
        Self {
            enabled: true,
            url_prefix: None,
        }
    }
}

impl AdapterSection {
    /// Builds the immutable per-adapter config handed to the registry.
    pub fn resolve(&self, name: &str, default_prefix: &str) -> AdapterConfig {
        let mut config = AdapterConfig::new(
            name,
            self.url_prefix.as_deref().unwrap_or(default_prefix),
        );
        config.enabled = self.enabled;
        config
    }
}

/// Bot tokens for outbound platform delivery. A missing token leaves the
/// platform's inbound parsing available while outbound sends are skipped
/// with a warning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookTokens {
    pub telegram_bot_token: Option<String>,
    pub slack_bot_token: Option<String>,
    pub discord_bot_token: Option<String>,
}

/// Broker connection settings for the ACP-style adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_broker_url")]
    pub url: String,

    /// Inbound subject this agent instance consumes.
    #[serde(default = "default_broker_subject")]
    pub subject: String,

    /// Seconds allowed per message before an error reply is published.
    #[serde(default = "default_process_timeout")]
    pub process_timeout_secs: u64,
}

fn default_broker_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_broker_subject() -> String {
    "prism.requests".to_string()
}

fn default_process_timeout() -> u64 {
    30
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            subject: default_broker_subject(),
            process_timeout_secs: default_process_timeout(),
        }
    }
}

impl PrismConfig {
    /// Loads settings from an optional TOML file, applies environment
    /// overrides, and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Environment overrides. Gateway settings use the `PRISM_` prefix;
    /// platform tokens and the broker URL keep their ecosystem names.
    pub fn apply_env(&mut self) {
        if let Ok(host) = env::var("PRISM_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env::var("PRISM_PORT").ok().and_then(|s| s.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(origins) = env::var("PRISM_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
        if let Some(limit) = env::var("PRISM_SESSION_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.session.history_limit = limit;
        }

        for (var, section) in [
            ("PRISM_MCP_ENABLED", &mut self.adapters.mcp),
            ("PRISM_WEBHOOK_ENABLED", &mut self.adapters.webhook),
            ("PRISM_A2A_ENABLED", &mut self.adapters.a2a),
            ("PRISM_ACP_ENABLED", &mut self.adapters.acp),
        ] {
            if let Some(enabled) = env::var(var).ok().as_deref().map(parse_bool) {
                section.enabled = enabled;
            }
        }

        if let Ok(token) = env::var("TELEGRAM_BOT_TOKEN") {
            self.webhook.telegram_bot_token = Some(token);
        }
        if let Ok(token) = env::var("SLACK_BOT_TOKEN") {
            self.webhook.slack_bot_token = Some(token);
        }
        if let Ok(token) = env::var("DISCORD_BOT_TOKEN") {
            self.webhook.discord_bot_token = Some(token);
        }

        if let Ok(url) = env::var("NATS_URL") {
            self.broker.url = url;
        }
        if let Ok(subject) = env::var("PRISM_BROKER_SUBJECT") {
            self.broker.subject = subject;
        }
        if let Some(secs) = env::var("PRISM_BROKER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.broker.process_timeout_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::Invalid("server host cannot be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server port cannot be 0".into()));
        }
        if self
            .server
            .allowed_origins
            .iter()
            .any(|origin| origin.is_empty())
        {
            return Err(ConfigError::Invalid("allowed origin cannot be empty".into()));
        }
        if self.session.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "session history limit must be at least 1".into(),
            ));
        }
        if self.adapters.acp.enabled {
            if self.broker.url.is_empty() {
                return Err(ConfigError::Invalid(
                    "broker url required while the acp adapter is enabled".into(),
                ));
            }
            if self.broker.subject.is_empty() {
                return Err(ConfigError::Invalid(
                    "broker subject required while the acp adapter is enabled".into(),
                ));
            }
            if self.broker.process_timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "broker processing timeout must be greater than 0".into(),
                ));
            }
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
