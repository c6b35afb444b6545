//! Prism gateway host
//!
//! Assembles the REST surface, the adapter registry, and the HTTP listener
//! around one [`prism_core::Agent`] implementation. The binary in `main.rs`
//! wires in the demo echo agent; embedders call [`start_server`] with their
//! own agent and configuration.

pub mod adapters;
pub mod error;
pub mod registry;
pub mod routes;
pub mod server;

pub use adapters::{A2aAdapter, AcpAdapter, McpAdapter, WebhookAdapter};
pub use error::ServerError;
pub use registry::{AdapterDescriptor, AdapterRegistry, ProtocolAdapter};
pub use routes::{routes, GatewayState};
pub use server::{build_registry, build_router, start_server};
