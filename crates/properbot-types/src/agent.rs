//! Agent configuration, actions, and run outcomes.
//!
//! The structured-chat contract: each model turn is parsed into an
//! `AgentAction` -- either a tool invocation or the final answer.

use serde::{Deserialize, Serialize};

use crate::llm::Usage;

/// LLM settings for running the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Upper bound on tool-call iterations per user turn.
    pub max_iterations: u32,
    /// Number of past turns (user + assistant pairs) kept in the prompt.
    pub window_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            max_iterations: 6,
            window_turns: 5,
        }
    }
}

/// A structured action parsed from a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentAction {
    /// Invoke a named tool with structured arguments.
    Tool {
        name: String,
        input: serde_json::Value,
    },
    /// The model's final answer; ends the loop.
    FinalAnswer { text: String },
}

/// One completed tool step within an agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    pub tool: String,
    pub input: serde_json::Value,
    pub observation: String,
}

/// Result of a full agent run for one user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub answer: String,
    pub steps: Vec<AgentStep>,
    pub usage: Usage,
    /// Number of LLM calls it took to reach the answer.
    pub iterations: u32,
}

/// Progress events emitted while an agent run is in flight.
///
/// Transports (SSE, the REPL) subscribe to these to surface tool activity
/// before the final answer lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    ToolCall {
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        name: String,
        summary: String,
    },
    FinalAnswer {
        text: String,
    },
    Usage(Usage),
}
