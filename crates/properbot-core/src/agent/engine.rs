//! Agent execution engine.
//!
//! AgentEngine assembles `CompletionRequest`s from the agent context plus
//! the in-flight scratchpad and sends them through `BoxLlmProvider`.
//! Tracing spans instrument every LLM call.

use tracing::{Instrument, info_span};

use properbot_types::llm::{CompletionRequest, CompletionResponse, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;

use super::context::AgentContext;

/// Executes LLM calls on behalf of the agent.
///
/// Holds a `BoxLlmProvider` for runtime provider dispatch and builds
/// `CompletionRequest`s from `AgentContext` state.
pub struct AgentEngine {
    provider: BoxLlmProvider,
}

impl AgentEngine {
    /// Create a new agent engine with the given LLM provider.
    pub fn new(provider: BoxLlmProvider) -> Self {
        Self { provider }
    }

    /// Access the underlying provider.
    pub fn provider(&self) -> &BoxLlmProvider {
        &self.provider
    }

    /// Execute one non-streaming LLM call.
    ///
    /// The request carries the windowed conversation history followed by
    /// the scratchpad: the current user message and any intermediate
    /// action/observation exchanges of this run.
    pub async fn execute(
        &self,
        context: &AgentContext,
        scratchpad: &[Message],
    ) -> Result<CompletionResponse, LlmError> {
        let request = self.build_request(context, scratchpad);

        let span = info_span!(
            "llm.complete",
            provider = self.provider.name(),
            model = %request.model,
            max_tokens = request.max_tokens,
            temperature = ?request.temperature,
        );

        self.provider.complete(&request).instrument(span).await
    }

    /// Build a CompletionRequest from the agent context and scratchpad.
    fn build_request(&self, context: &AgentContext, scratchpad: &[Message]) -> CompletionRequest {
        let mut messages = context.build_messages();
        messages.extend(scratchpad.iter().cloned());

        CompletionRequest {
            model: context.agent_config.model.clone(),
            messages,
            system: Some(context.system_prompt.clone()),
            max_tokens: context.agent_config.max_tokens,
            temperature: Some(context.agent_config.temperature),
            stream: false,
            stop_sequences: None,
        }
    }
}
