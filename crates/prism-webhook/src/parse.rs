//! Platform payload parsing
//!
//! Each parser is a pure mapping from one platform's webhook JSON to a
//! [`ParsedMessage`]: the text, the user who sent it, the chat or channel
//! it arrived in, and whatever platform fields are worth keeping around as
//! metadata. The chat id doubles as the session key and as the outbound
//! delivery target.

use prism_core::{AgentRequest, Metadata, PrismError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A platform payload reduced to the fields the agent cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMessage {
    pub platform: &'static str,
    pub text: String,
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
    pub metadata: Metadata,
}

impl ParsedMessage {
    /// Convert into a canonical request, folding the platform identity and
    /// user id into the metadata map.
    pub fn into_request(self) -> AgentRequest {
        let mut metadata = self.metadata;
        if let Some(user_id) = &self.user_id {
            metadata.insert("user_id".to_string(), json!(user_id));
        }
        metadata.insert("platform".to_string(), json!(self.platform));
        metadata.insert("source_protocol".to_string(), json!("webhook"));

        AgentRequest {
            message: self.text,
            session_id: self.chat_id,
            metadata,
            tools: None,
        }
    }
}

/// Dispatch to the parser for `platform`.
pub fn parse_platform(platform: &str, payload: &Value) -> Result<ParsedMessage, PrismError> {
    match platform {
        "telegram" => parse_telegram(payload),
        "slack" => parse_slack(payload),
        "discord" => parse_discord(payload),
        other => Err(PrismError::Validation(format!(
            "unknown webhook platform '{other}'"
        ))),
    }
}

/// Telegram update: text under `message.text`, sender under `message.from`,
/// conversation under `message.chat`.
pub fn parse_telegram(payload: &Value) -> Result<ParsedMessage, PrismError> {
    let message = payload
        .get("message")
        .and_then(Value::as_object)
        .ok_or_else(|| PrismError::Validation("telegram payload missing 'message'".to_string()))?;

    let text = message
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let user_id = message.get("from").and_then(|f| f.get("id")).and_then(id_string);
    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(id_string)
        .ok_or_else(|| PrismError::Validation("telegram payload missing 'chat.id'".to_string()))?;

    let mut metadata = Metadata::new();
    if let Some(message_id) = message.get("message_id") {
        metadata.insert("message_id".to_string(), message_id.clone());
    }
    if let Some(chat_type) = message.get("chat").and_then(|c| c.get("type")) {
        metadata.insert("chat_type".to_string(), chat_type.clone());
    }
    if let Some(username) = message.get("from").and_then(|f| f.get("username")) {
        metadata.insert("username".to_string(), username.clone());
    }

    Ok(ParsedMessage {
        platform: "telegram",
        text,
        user_id,
        chat_id: Some(chat_id),
        metadata,
    })
}

/// Slack event: flat `text` / `user` / `channel` fields.
pub fn parse_slack(payload: &Value) -> Result<ParsedMessage, PrismError> {
    let text = payload
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let user_id = payload.get("user").and_then(id_string);
    let chat_id = payload
        .get("channel")
        .and_then(id_string)
        .ok_or_else(|| PrismError::Validation("slack payload missing 'channel'".to_string()))?;

    let mut metadata = Metadata::new();
    if let Some(team) = payload.get("team") {
        metadata.insert("team".to_string(), team.clone());
    }
    if let Some(channel_name) = payload.get("channel_name") {
        metadata.insert("channel_name".to_string(), channel_name.clone());
    }
    if let Some(ts) = payload.get("ts") {
        metadata.insert("timestamp".to_string(), ts.clone());
    }

    Ok(ParsedMessage {
        platform: "slack",
        text,
        user_id,
        chat_id: Some(chat_id),
        metadata,
    })
}

/// Discord message: `content`, `author.id`, `channel_id`.
pub fn parse_discord(payload: &Value) -> Result<ParsedMessage, PrismError> {
    let text = payload
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let user_id = payload.get("author").and_then(|a| a.get("id")).and_then(id_string);
    let chat_id = payload
        .get("channel_id")
        .and_then(id_string)
        .ok_or_else(|| PrismError::Validation("discord payload missing 'channel_id'".to_string()))?;

    let mut metadata = Metadata::new();
    if let Some(username) = payload.get("author").and_then(|a| a.get("username")) {
        metadata.insert("username".to_string(), username.clone());
    }
    if let Some(guild_id) = payload.get("guild_id") {
        metadata.insert("guild_id".to_string(), guild_id.clone());
    }
    if let Some(message_id) = payload.get("id") {
        metadata.insert("message_id".to_string(), message_id.clone());
    }

    Ok(ParsedMessage {
        platform: "discord",
        text,
        user_id,
        chat_id: Some(chat_id),
        metadata,
    })
}

/// Generic webhook body for platforms without a dedicated parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericWebhook {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl GenericWebhook {
    /// Convert into a canonical request. When no session id is given but
    /// both platform and user id are, the session key is
    /// `"{platform}-{user_id}"` so repeat callers land in one conversation.
    pub fn into_request(self) -> AgentRequest {
        let session_id = self.session_id.or_else(|| match (&self.platform, &self.user_id) {
            (Some(platform), Some(user_id)) => Some(format!("{platform}-{user_id}")),
            _ => None,
        });

        let mut metadata = self.metadata;
        if let Some(user_id) = &self.user_id {
            metadata.insert("user_id".to_string(), json!(user_id));
        }
        if let Some(platform) = &self.platform {
            metadata.insert("platform".to_string(), json!(platform));
        }
        metadata.insert("source_protocol".to_string(), json!("webhook"));

        AgentRequest {
            message: self.message,
            session_id,
            metadata,
            tools: None,
        }
    }
}

/// Chat and user ids arrive as numbers from Telegram and as strings from
/// Slack and Discord; both become strings here.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_numeric_ids_become_strings() {
        let payload = json!({
            "message": {
                "message_id": 5,
                "text": "hello",
                "chat": { "id": 42, "type": "private" },
                "from": { "id": 99, "username": "ada" },
            }
        });

        let parsed = parse_telegram(&payload).unwrap();
        assert_eq!(parsed.text, "hello");
        assert_eq!(parsed.user_id.as_deref(), Some("99"));
        assert_eq!(parsed.chat_id.as_deref(), Some("42"));
        assert_eq!(parsed.metadata["message_id"], 5);
        assert_eq!(parsed.metadata["chat_type"], "private");
        assert_eq!(parsed.metadata["username"], "ada");
    }

    #[test]
    fn telegram_without_chat_id_is_invalid() {
        let payload = json!({ "message": { "text": "hi", "from": { "id": 1 } } });
        let err = parse_telegram(&payload).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn telegram_without_message_is_invalid() {
        let err = parse_telegram(&json!({ "update_id": 1 })).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn slack_channel_becomes_the_chat_id() {
        let payload = json!({
            "text": "hi there",
            "user": "U123",
            "channel": "C456",
            "team": "T789",
            "channel_name": "general",
            "ts": "1700000000.000100",
        });

        let parsed = parse_slack(&payload).unwrap();
        assert_eq!(parsed.chat_id.as_deref(), Some("C456"));
        assert_eq!(parsed.user_id.as_deref(), Some("U123"));
        assert_eq!(parsed.metadata["team"], "T789");
        assert_eq!(parsed.metadata["channel_name"], "general");
        assert_eq!(parsed.metadata["timestamp"], "1700000000.000100");
    }

    #[test]
    fn discord_author_and_channel_map_through() {
        let payload = json!({
            "content": "yo",
            "author": { "id": "77", "username": "sam" },
            "channel_id": "555",
            "guild_id": "g-1",
            "id": "m-1",
        });

        let parsed = parse_discord(&payload).unwrap();
        assert_eq!(parsed.text, "yo");
        assert_eq!(parsed.user_id.as_deref(), Some("77"));
        assert_eq!(parsed.chat_id.as_deref(), Some("555"));
        assert_eq!(parsed.metadata["username"], "sam");
        assert_eq!(parsed.metadata["guild_id"], "g-1");
        assert_eq!(parsed.metadata["message_id"], "m-1");
    }

    #[test]
    fn into_request_tags_the_source() {
        let payload = json!({
            "message": { "text": "hello", "chat": { "id": 42 }, "from": { "id": 99 } }
        });

        let request = parse_telegram(&payload).unwrap().into_request();
        assert_eq!(request.session_id.as_deref(), Some("42"));
        assert_eq!(request.metadata["platform"], "telegram");
        assert_eq!(request.metadata["user_id"], "99");
        assert_eq!(request.metadata["source_protocol"], "webhook");
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let err = parse_platform("matrix", &json!({})).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn generic_builds_a_platform_scoped_session() {
        let payload = GenericWebhook {
            message: "hi".to_string(),
            user_id: Some("u1".to_string()),
            session_id: None,
            platform: Some("web".to_string()),
            metadata: Metadata::new(),
        };

        let request = payload.into_request();
        assert_eq!(request.session_id.as_deref(), Some("web-u1"));
        assert_eq!(request.metadata["platform"], "web");
    }

    #[test]
    fn generic_explicit_session_wins() {
        let payload = GenericWebhook {
            message: "hi".to_string(),
            user_id: Some("u1".to_string()),
            session_id: Some("keep-me".to_string()),
            platform: Some("web".to_string()),
            metadata: Metadata::new(),
        };

        assert_eq!(payload.into_request().session_id.as_deref(), Some("keep-me"));
    }
}
