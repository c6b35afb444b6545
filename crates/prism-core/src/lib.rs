//! Core contract for the Prism gateway
//!
//! Every protocol adapter translates to and from the types in this crate.
//! The shape of the system:
//!
//! - **`Agent`**: the one trait a conversational agent implements
//!   (`initialize`, `process`, `get_schema`). Adapters depend on the trait
//!   object, never on a concrete agent type.
//! - **`AgentRequest` / `AgentResponse`**: the canonical message pair all
//!   wire formats normalize into and serialize out of.
//! - **`SchemaDoc`**: the single schema document every protocol manifest is
//!   derived from. Manifest builders call `Agent::get_schema` on every
//!   request rather than caching the document.
//! - **`SessionStore`**: bounded per-key conversation history shared by all
//!   adapters.
//! - **`dispatch`**: the one choke point between adapters and the agent.
//!   Validation and session recording happen here, so no adapter can hand
//!   the agent an empty message or fork its own copy of the history.

pub mod adapter;
pub mod agent;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod schema;
pub mod session;

pub use adapter::AdapterConfig;
pub use agent::{Agent, AgentError};
pub use dispatch::dispatch;
pub use error::PrismError;
pub use message::{AgentRequest, AgentResponse, Metadata};
pub use schema::{SchemaDoc, ToolSpec};
pub use session::{Exchange, Role, Session, SessionStore, DEFAULT_HISTORY_LIMIT};
