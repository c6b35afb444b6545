//! Webhook adapter
//!
//! Accepts inbound payloads from chat platforms (Telegram, Slack, Discord,
//! or a generic JSON shape), normalizes each to the canonical request, and
//! pushes the agent's reply back out through the platform's send-message
//! API using the configured bot token.
//!
//! The inbound ack and the outbound push are decoupled: once a payload
//! parses and the agent answers, the handler returns 200 even if the
//! outbound delivery fails. Delivery errors surface in logs only.
//!
//! Routes (mounted under the adapter's prefix):
//!
//! - `POST /` (generic payload)
//! - `POST /telegram`
//! - `POST /slack`
//! - `POST /discord`
//! - `GET  /health`

pub mod gateway;
pub mod manifest;
pub mod parse;
pub mod routes;

pub use gateway::{DiscordGateway, PlatformGateway, SlackGateway, TelegramGateway};
pub use manifest::{PlatformEndpoint, WebhookManifest};
pub use parse::{parse_platform, GenericWebhook, ParsedMessage};
pub use routes::{routes, WebhookReply, WebhookState};
