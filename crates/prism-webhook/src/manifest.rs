//! Webhook manifest derivation

use prism_core::{PrismError, SchemaDoc};
use serde::{Deserialize, Serialize};

/// One inbound endpoint advertised in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformEndpoint {
    pub platform: String,
    pub method: String,
    pub path: String,
}

/// Capability listing for the webhook surface: which platform endpoints are
/// mounted under the adapter's prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<PlatformEndpoint>,
}

impl WebhookManifest {
    pub fn derive(schema: &SchemaDoc, prefix: &str) -> Result<Self, PrismError> {
        schema.validate()?;

        let post = |platform: &str, path: String| PlatformEndpoint {
            platform: platform.to_string(),
            method: "POST".to_string(),
            path,
        };

        Ok(Self {
            name: format!("{}-webhook", schema.name),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: format!("Webhook adapter for the {} agent", schema.name),
            endpoints: vec![
                post("generic", format!("{prefix}/")),
                post("telegram", format!("{prefix}/telegram")),
                post("slack", format!("{prefix}/slack")),
                post("discord", format!("{prefix}/discord")),
                PlatformEndpoint {
                    platform: "health".to_string(),
                    method: "GET".to_string(),
                    path: format!("{prefix}/health"),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demo_schema() -> SchemaDoc {
        SchemaDoc {
            name: "demo".to_string(),
            description: "A demo agent".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "message": { "type": "string" } },
                "required": ["message"],
            }),
            output_schema: json!({ "type": "object" }),
            capabilities: vec!["chat".to_string()],
            tools: Vec::new(),
        }
    }

    #[test]
    fn manifest_lists_every_platform_endpoint() {
        let manifest = WebhookManifest::derive(&demo_schema(), "/webhook").unwrap();

        assert_eq!(manifest.name, "demo-webhook");
        let platforms: Vec<&str> = manifest
            .endpoints
            .iter()
            .map(|endpoint| endpoint.platform.as_str())
            .collect();
        assert_eq!(
            platforms,
            ["generic", "telegram", "slack", "discord", "health"]
        );
        assert_eq!(manifest.endpoints[1].path, "/webhook/telegram");
        assert_eq!(manifest.endpoints[4].method, "GET");
    }

    #[test]
    fn derivation_fails_without_message_property() {
        let mut schema = demo_schema();
        schema.input_schema = json!({ "type": "object", "properties": {} });

        let err = WebhookManifest::derive(&schema, "/webhook").unwrap_err();
        assert_eq!(err.kind(), "schema_error");
    }
}
