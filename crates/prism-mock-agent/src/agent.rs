//! Agent implementations
//!
//! `EchoAgent` is the demo agent served by the default binary; `MockAgent`
//! exists for adapter tests. Both return the same schema shape so manifest
//! derivation behaves identically against either.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use prism_core::{Agent, AgentError, AgentRequest, AgentResponse, SchemaDoc, ToolSpec};
use serde_json::json;
use tracing::debug;

use crate::behaviors::MockBehavior;

fn demo_schema(name: &str, description: &str) -> SchemaDoc {
    SchemaDoc {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The input message to the agent",
                    "example": "What time is it?"
                },
                "session_id": {
                    "type": "string",
                    "description": "Session identifier for conversation continuity",
                    "example": "user123_session456"
                }
            },
            "required": ["message"]
        }),
        output_schema: json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The agent's response message"
                },
                "session_id": {
                    "type": "string",
                    "description": "Session identifier"
                },
                "metadata": {
                    "type": "object",
                    "description": "Response metadata"
                }
            },
            "required": ["message"]
        }),
        capabilities: vec!["chat".into(), "tool_use".into(), "sessions".into()],
        tools: vec![
            ToolSpec {
                name: "get_current_time".into(),
                description: "Get the current time".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            },
            ToolSpec {
                name: "calculate".into(),
                description: "Calculate a simple arithmetic expression".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "expression": {
                            "type": "string",
                            "description": "Expression of the form 'a op b'"
                        }
                    },
                    "required": ["expression"]
                }),
            },
        ],
    }
}

/// Evaluates `"a op b"` for the four basic operators.
fn eval_expression(expr: &str) -> Option<f64> {
    let tokens: Vec<&str> = expr.split_whitespace().collect();
    let [a, op, b] = tokens.as_slice() else {
        return None;
    };
    let a: f64 = a.parse().ok()?;
    let b: f64 = b.parse().ok()?;
    match *op {
        "+" => Some(a + b),
        "-" => Some(a - b),
        "*" | "x" => Some(a * b),
        "/" if b != 0.0 => Some(a / b),
        _ => None,
    }
}

/// The demo agent: echoes input, with a time lookup and a tiny calculator
/// wired in as tools so responses exercise `tools_used`.
pub struct EchoAgent {
    name: String,
}

impl EchoAgent {
    pub fn new() -> Self {
        Self {
            name: "echo-agent".to_string(),
        }
    }
}

impl Default for EchoAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for EchoAgent {
    async fn initialize(&self) -> Result<(), AgentError> {
        debug!(agent = %self.name, "initialized");
        Ok(())
    }

    async fn process(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        let trimmed = request.message.trim();
        let (message, tools_used) = if let Some(expr) = trimmed.strip_prefix("calculate ") {
            let reply = match eval_expression(expr) {
                Some(value) => format!("{expr} = {value}"),
                None => format!("I could not evaluate '{expr}'"),
            };
            (reply, vec!["calculate".to_string()])
        } else if trimmed.to_lowercase().contains("time") {
            (
                format!(
                    "The current time is {}",
                    Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
                ),
                vec!["get_current_time".to_string()],
            )
        } else {
            (format!("Echo: {trimmed}"), Vec::new())
        };

        Ok(AgentResponse::new(message)
            .with_session(request.session_id)
            .with_tools_used(tools_used)
            .with_metadata("agent", json!(self.name)))
    }

    fn get_schema(&self) -> SchemaDoc {
        demo_schema(&self.name, "Demo agent that echoes messages and runs two sample tools")
    }
}

/// Test agent with configurable behavior and a call counter.
pub struct MockAgent {
    name: String,
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockAgent {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            name: "mock-agent".to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(message.into()))
    }

    /// Number of `process` calls the agent has seen.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for MockAgent {
    async fn initialize(&self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn process(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let message = match &self.behavior {
            MockBehavior::Echo => format!("echo: {}", request.message),
            MockBehavior::Scripted(lines) if lines.is_empty() => String::from("(no script)"),
            MockBehavior::Scripted(lines) => lines[call % lines.len()].clone(),
            MockBehavior::Fail(message) => {
                return Err(AgentError::Processing(message.clone()));
            }
            MockBehavior::Delayed(delay) => {
                tokio::time::sleep(*delay).await;
                format!("echo: {}", request.message)
            }
        };

        Ok(AgentResponse::new(message)
            .with_session(request.session_id)
            .with_metadata("agent", json!(self.name)))
    }

    fn get_schema(&self) -> SchemaDoc {
        demo_schema(&self.name, "Configurable mock agent for tests")
    }
}
