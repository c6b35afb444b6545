//! Broker messaging adapter
//!
//! Asynchronous request/reply over NATS. The consumer subscribes to one
//! inbound subject; every message carries (or is assigned) a correlation id
//! and names a reply target, and every message gets a reply on that target
//! with the same correlation id, success or not. A sender waiting on its
//! reply subject never hangs on this layer's account.
//!
//! Redelivery and at-least-once concerns stay with the broker. This layer
//! only guarantees parse, dispatch, reply.

pub mod consumer;
pub mod error;
pub mod manifest;
pub mod wire;

pub use consumer::{connect, AcpConsumer, PendingReply, ReplyPublisher};
pub use error::AcpError;
pub use manifest::AcpManifest;
pub use wire::{BrokerReply, BrokerRequest, ReplyError};
