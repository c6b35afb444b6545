//! Demo and test agents
//!
//! Two implementations of the canonical [`prism_core::Agent`] trait:
//!
//! - [`EchoAgent`]: the agent the default binary serves. Echoes messages
//!   and answers two demo tool requests (current time, simple arithmetic).
//! - [`MockAgent`]: configurable behaviors for adapter tests (fixed
//!   scripts, injected failures, artificial delays).
//!
//! # Example
//!
//! ```no_run
//! use prism_mock_agent::{MockAgent, MockBehavior};
//!
//! let agent = MockAgent::new(MockBehavior::Scripted(vec!["first".into(), "second".into()]));
//! assert_eq!(agent.call_count(), 0);
//! ```

mod agent;
mod behaviors;

pub use agent::{EchoAgent, MockAgent};
pub use behaviors::MockBehavior;
