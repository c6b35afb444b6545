//! Peer messaging adapter
//!
//! Lets other agents talk to this one over a single synchronous endpoint.
//! An inbound peer message carries the sender's agent id; the reply is the
//! canonical response, returned directly in the HTTP body with no broker
//! in between. Discovery happens through the agent card, a derived
//! document peers fetch before sending anything.

pub mod card;
pub mod routes;

pub use card::{AgentCard, CardCapabilities};
pub use routes::{routes, A2aState, PeerMessage};
