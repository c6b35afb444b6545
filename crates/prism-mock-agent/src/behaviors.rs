//! Mock agent behavior definitions

use std::time::Duration;

/// How the mock agent answers `process` calls.
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Replies `"echo: {message}"`.
    Echo,

    /// Replies from a fixed script, cycling when exhausted.
    Scripted(Vec<String>),

    /// Fails every call with this message.
    Fail(String),

    /// Sleeps before echoing, for timeout handling tests.
    Delayed(Duration),
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self::Echo
    }
}
