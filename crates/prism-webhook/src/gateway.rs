//! Outbound delivery to platform send-message APIs
//!
//! One gateway per platform, injected into [`crate::WebhookState`] so route
//! handlers never talk to the network directly and tests can substitute a
//! recording fake. All failures map to the delivery error kind; callers
//! log them and keep going.

use async_trait::async_trait;
use prism_core::PrismError;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

pub const TELEGRAM_API: &str = "https://api.telegram.org";
pub const SLACK_API: &str = "https://slack.com/api";
pub const DISCORD_API: &str = "https://discord.com/api/v10";

/// Pushes agent replies back into a platform conversation.
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// Platform key this gateway serves, matching the inbound route name.
    fn platform(&self) -> &'static str;

    /// Send `text` to the conversation identified by `target` (the chat or
    /// channel id parsed from the inbound payload).
    async fn deliver(&self, target: &str, text: &str) -> Result<(), PrismError>;
}

/// Telegram Bot API gateway (`sendMessage`).
pub struct TelegramGateway {
    token: String,
    base_url: String,
    client: Client,
}

impl TelegramGateway {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: TELEGRAM_API.to_string(),
            client,
        }
    }

    /// Point the gateway at a different API host. Used in tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PlatformGateway for TelegramGateway {
    fn platform(&self) -> &'static str {
        "telegram"
    }

    async fn deliver(&self, chat_id: &str, text: &str) -> Result<(), PrismError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|err| PrismError::Delivery(format!("telegram send failed: {err}")))?;

        if !response.status().is_success() {
            return Err(PrismError::Delivery(format!(
                "telegram send returned {}",
                response.status()
            )));
        }

        debug!(chat_id, "delivered telegram reply");
        Ok(())
    }
}

/// Slack Web API gateway (`chat.postMessage`).
///
/// Slack reports API errors inside a 200 body as `{"ok": false}`, so the
/// body is inspected as well as the status.
pub struct SlackGateway {
    token: String,
    base_url: String,
    client: Client,
}

impl SlackGateway {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: SLACK_API.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PlatformGateway for SlackGateway {
    fn platform(&self) -> &'static str {
        "slack"
    }

    async fn deliver(&self, channel: &str, text: &str) -> Result<(), PrismError> {
        let url = format!("{}/chat.postMessage", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "channel": channel, "text": text }))
            .send()
            .await
            .map_err(|err| PrismError::Delivery(format!("slack send failed: {err}")))?;

        if !response.status().is_success() {
            return Err(PrismError::Delivery(format!(
                "slack send returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| PrismError::Delivery(format!("slack send returned bad json: {err}")))?;
        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let reason = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            return Err(PrismError::Delivery(format!("slack send rejected: {reason}")));
        }

        debug!(channel, "delivered slack reply");
        Ok(())
    }
}

/// Discord REST gateway (`POST /channels/{id}/messages`).
pub struct DiscordGateway {
    token: String,
    base_url: String,
    client: Client,
}

impl DiscordGateway {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DISCORD_API.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PlatformGateway for DiscordGateway {
    fn platform(&self) -> &'static str {
        "discord"
    }

    async fn deliver(&self, channel_id: &str, text: &str) -> Result<(), PrismError> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|err| PrismError::Delivery(format!("discord send failed: {err}")))?;

        if !response.status().is_success() {
            return Err(PrismError::Delivery(format!(
                "discord send returned {}",
                response.status()
            )));
        }

        debug!(channel_id, "delivered discord reply");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn telegram_gateway_posts_send_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot12345/sendMessage")
            .match_body(Matcher::Json(json!({ "chat_id": "42", "text": "hello" })))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let gateway = TelegramGateway::new(Client::new(), "12345").with_base_url(server.url());
        gateway.deliver("42", "hello").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn telegram_gateway_surfaces_http_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bot12345/sendMessage")
            .with_status(403)
            .create_async()
            .await;

        let gateway = TelegramGateway::new(Client::new(), "12345").with_base_url(server.url());
        let err = gateway.deliver("42", "hello").await.unwrap_err();
        assert_eq!(err.kind(), "delivery_error");
    }

    #[tokio::test]
    async fn slack_gateway_rejects_ok_false_bodies() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat.postMessage")
            .match_header("authorization", "Bearer xoxb-1")
            .with_status(200)
            .with_body(r#"{"ok":false,"error":"channel_not_found"}"#)
            .create_async()
            .await;

        let gateway = SlackGateway::new(Client::new(), "xoxb-1").with_base_url(server.url());
        let err = gateway.deliver("C404", "hello").await.unwrap_err();
        assert_eq!(err.kind(), "delivery_error");
        assert!(err.detail().contains("channel_not_found"));
    }

    #[tokio::test]
    async fn slack_gateway_accepts_ok_true() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat.postMessage")
            .match_body(Matcher::Json(json!({ "channel": "C1", "text": "hi" })))
            .with_status(200)
            .with_body(r#"{"ok":true,"ts":"1700000000.000100"}"#)
            .create_async()
            .await;

        let gateway = SlackGateway::new(Client::new(), "xoxb-1").with_base_url(server.url());
        gateway.deliver("C1", "hi").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn discord_gateway_targets_the_channel_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/channels/555/messages")
            .match_header("authorization", "Bot tok")
            .match_body(Matcher::Json(json!({ "content": "yo" })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let gateway = DiscordGateway::new(Client::new(), "tok").with_base_url(server.url());
        gateway.deliver("555", "yo").await.unwrap();
        mock.assert_async().await;
    }
}
