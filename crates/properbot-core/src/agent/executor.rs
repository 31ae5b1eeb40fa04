//! The structured-chat agent loop.
//!
//! One `run` handles a single user message: call the model, parse the
//! action, dispatch tools, feed observations back, and repeat until the
//! model gives a final answer or the iteration budget runs out.
//!
//! Recoverable failures never abort a run -- a malformed action, an
//! unknown tool name, or a tool error is fed back to the model as an
//! observation so it can correct itself.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use properbot_types::agent::{AgentAction, AgentEvent, AgentOutcome, AgentStep};
use properbot_types::error::AgentError;
use properbot_types::llm::{Message, Usage};

use crate::tool::registry::ToolRegistry;
use crate::tool::ToolContext;

use super::action::parse_action;
use super::context::AgentContext;
use super::engine::AgentEngine;

/// Reminder appended to every observation so the model stays in format.
const NEXT_ACTION_REMINDER: &str =
    "Respond with your next action as a single fenced JSON block.";

/// Runs the structured-chat loop over an engine and a tool registry.
pub struct AgentExecutor {
    engine: AgentEngine,
    tools: ToolRegistry,
    max_iterations: u32,
}

impl AgentExecutor {
    /// Create an executor.
    pub fn new(engine: AgentEngine, tools: ToolRegistry, max_iterations: u32) -> Self {
        Self {
            engine,
            tools,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Access the engine (for utility calls like title generation).
    pub fn engine(&self) -> &AgentEngine {
        &self.engine
    }

    /// Access the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the loop for one user message.
    ///
    /// On success the caller is responsible for appending the user message
    /// and the final answer to `context.conversation_history`; the executor
    /// only mutates `context.last_query` (via tool state updates). Progress
    /// is reported through `events` when a sender is supplied.
    pub async fn run(
        &self,
        context: &mut AgentContext,
        user_message: &str,
        events: Option<&UnboundedSender<AgentEvent>>,
    ) -> Result<AgentOutcome, AgentError> {
        let mut scratchpad: Vec<Message> = vec![Message::user(user_message)];
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut usage = Usage::default();

        for iteration in 1..=self.max_iterations {
            let response = self.engine.execute(context, &scratchpad).await?;
            usage.add(&response.usage);

            match parse_action(&response.content) {
                Ok(AgentAction::FinalAnswer { text }) => {
                    debug!(iteration, "Agent produced final answer");
                    emit(events, AgentEvent::FinalAnswer { text: text.clone() });
                    emit(events, AgentEvent::Usage(usage.clone()));
                    return Ok(AgentOutcome {
                        answer: text,
                        steps,
                        usage,
                        iterations: iteration,
                    });
                }

                Ok(AgentAction::Tool { name, input }) => {
                    emit(
                        events,
                        AgentEvent::ToolCall {
                            name: name.clone(),
                            input: input.clone(),
                        },
                    );

                    let observation = self.dispatch(context, &name, input.clone()).await;
                    emit(
                        events,
                        AgentEvent::ToolResult {
                            name: name.clone(),
                            summary: summarize(&observation),
                        },
                    );

                    steps.push(AgentStep {
                        tool: name,
                        input,
                        observation: observation.clone(),
                    });

                    scratchpad.push(Message::assistant(response.content));
                    scratchpad.push(Message::user(format!(
                        "Observation: {observation}\n\n{NEXT_ACTION_REMINDER}"
                    )));
                }

                Err(parse_err) => {
                    // Feed the parse failure back instead of aborting,
                    // the same recovery the original agent ran with.
                    warn!(iteration, error = %parse_err, "Could not parse agent action");
                    scratchpad.push(Message::assistant(response.content));
                    scratchpad.push(Message::user(format!(
                        "Your response could not be parsed as an action: {parse_err}. \
                         {NEXT_ACTION_REMINDER}"
                    )));
                }
            }
        }

        Err(AgentError::MaxIterations(self.max_iterations))
    }

    /// Invoke a named tool, turning every failure into an observation.
    async fn dispatch(
        &self,
        context: &mut AgentContext,
        name: &str,
        input: serde_json::Value,
    ) -> String {
        let Some(tool) = self.tools.get(name) else {
            return format!(
                "Unknown tool '{name}'. Available tools: {}",
                self.tools.names().join(", ")
            );
        };

        let tool_ctx = ToolContext {
            last_query: context.last_query.clone(),
        };

        match tool.invoke(input, &tool_ctx).await {
            Ok(output) => {
                if let Some(query) = output.updated_query {
                    context.set_last_query(query);
                }
                output.observation
            }
            Err(e) => {
                warn!(tool = name, error = %e, "Tool invocation failed");
                e.to_string()
            }
        }
    }
}

/// First line of an observation, truncated for event payloads.
fn summarize(observation: &str) -> String {
    let first_line = observation.lines().next().unwrap_or_default();
    if first_line.len() > 120 {
        let cut = first_line
            .char_indices()
            .take_while(|(i, _)| *i < 117)
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        format!("{}...", &first_line[..cut])
    } else {
        first_line.to_string()
    }
}

fn emit(events: Option<&UnboundedSender<AgentEvent>>, event: AgentEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means the transport went away mid-run.
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::pin::Pin;
    use std::sync::Mutex;

    use futures_util::Stream;

    use properbot_types::agent::AgentConfig;
    use properbot_types::error::ToolError;
    use properbot_types::listing::ListingQuery;
    use properbot_types::llm::{
        CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
        StreamEvent, TokenCount,
    };

    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::provider::LlmProvider;
    use crate::tool::{BoxTool, Tool, ToolOutput};

    /// Provider that replays a fixed script of responses.
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
        capabilities: ProviderCapabilities,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<&str>) -> Self {
            let mut responses: Vec<String> =
                responses.into_iter().map(String::from).collect();
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                capabilities: ProviderCapabilities {
                    streaming: false,
                    tool_calling: true,
                    max_context_tokens: 128_000,
                    max_output_tokens: 4_096,
                },
            }
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| LlmError::Provider {
                    message: "script exhausted".to_string(),
                })?;
            Ok(CompletionResponse {
                id: "resp_1".to_string(),
                content,
                model: "scripted-1".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            })
        }

        fn stream(
            &self,
            _request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
            Box::pin(futures_util::stream::empty())
        }

        async fn count_tokens(
            &self,
            _request: &CompletionRequest,
        ) -> Result<TokenCount, LlmError> {
            Ok(TokenCount { input_tokens: 10 })
        }
    }

    /// Tool that records a query and returns a canned observation.
    struct StubSearchTool;

    impl Tool for StubSearchTool {
        fn name(&self) -> &str {
            "home_search"
        }

        fn description(&self) -> &str {
            "Stub search."
        }

        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }

        async fn invoke(
            &self,
            input: serde_json::Value,
            _ctx: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            let query: ListingQuery = serde_json::from_value(input).map_err(|e| {
                ToolError::InvalidArguments {
                    tool: "home_search".to_string(),
                    message: e.to_string(),
                }
            })?;
            Ok(ToolOutput {
                observation: format!("Found 2 listings near {}", query.location),
                updated_query: Some(query),
            })
        }
    }

    struct FailingTool;

    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "home_search"
        }

        fn description(&self) -> &str {
            "Always fails."
        }

        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }

        async fn invoke(
            &self,
            _input: serde_json::Value,
            _ctx: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            Err(ToolError::Failed {
                tool: "home_search".to_string(),
                message: "upstream timeout".to_string(),
            })
        }
    }

    fn executor_with(responses: Vec<&str>, tool: Option<BoxTool>) -> AgentExecutor {
        let engine = AgentEngine::new(BoxLlmProvider::new(ScriptedProvider::new(responses)));
        let registry = ToolRegistry::new();
        if let Some(tool) = tool {
            registry.register(tool);
        }
        AgentExecutor::new(engine, registry, 4)
    }

    fn context() -> AgentContext {
        AgentContext::new(AgentConfig::default(), "<persona>t</persona>".to_string(), None)
    }

    const FINAL: &str =
        r#"```json
{"action": "Final Answer", "action_input": "There are 2 houses."}
```"#;

    const SEARCH: &str = r#"```json
{"action": "home_search", "action_input": {"location": "San Mateo, CA"}}
```"#;

    #[tokio::test]
    async fn test_immediate_final_answer() {
        let executor = executor_with(vec![FINAL], None);
        let mut ctx = context();

        let outcome = executor.run(&mut ctx, "Any houses?", None).await.unwrap();
        assert_eq!(outcome.answer, "There are 2 houses.");
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.usage.input_tokens, 10);
    }

    #[tokio::test]
    async fn test_tool_then_final_answer() {
        let executor = executor_with(vec![SEARCH, FINAL], Some(BoxTool::new(StubSearchTool)));
        let mut ctx = context();

        let outcome = executor
            .run(&mut ctx, "Houses in San Mateo?", None)
            .await
            .unwrap();

        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.steps[0].tool, "home_search");
        assert!(outcome.steps[0].observation.contains("San Mateo"));
        // Two LLM calls worth of usage
        assert_eq!(outcome.usage.input_tokens, 20);
        // Tool state propagated into the context
        assert_eq!(
            ctx.last_query.as_ref().map(|q| q.location.as_str()),
            Some("San Mateo, CA")
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_fed_back() {
        let bad_tool = r#"{"action": "teleport", "action_input": {}}"#;
        let executor = executor_with(
            vec![bad_tool, FINAL],
            Some(BoxTool::new(StubSearchTool)),
        );
        let mut ctx = context();

        let outcome = executor.run(&mut ctx, "hi", None).await.unwrap();
        assert_eq!(outcome.iterations, 2);
        assert!(outcome.steps[0].observation.contains("Unknown tool 'teleport'"));
        assert!(outcome.steps[0].observation.contains("home_search"));
    }

    #[tokio::test]
    async fn test_malformed_action_fed_back() {
        let executor = executor_with(vec!["I will search now.", FINAL], None);
        let mut ctx = context();

        let outcome = executor.run(&mut ctx, "hi", None).await.unwrap();
        // The malformed turn consumed an iteration but produced no step
        assert_eq!(outcome.iterations, 2);
        assert!(outcome.steps.is_empty());
    }

    #[tokio::test]
    async fn test_tool_error_becomes_observation() {
        let executor = executor_with(vec![SEARCH, FINAL], Some(BoxTool::new(FailingTool)));
        let mut ctx = context();

        let outcome = executor.run(&mut ctx, "hi", None).await.unwrap();
        assert!(outcome.steps[0].observation.contains("upstream timeout"));
    }

    #[tokio::test]
    async fn test_max_iterations_exhausted() {
        let loops = vec![SEARCH, SEARCH, SEARCH, SEARCH];
        let executor = executor_with(loops, Some(BoxTool::new(StubSearchTool)));
        let mut ctx = context();

        let err = executor.run(&mut ctx, "hi", None).await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(4)));
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let executor = executor_with(vec![SEARCH, FINAL], Some(BoxTool::new(StubSearchTool)));
        let mut ctx = context();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        executor.run(&mut ctx, "hi", Some(&tx)).await.unwrap();
        drop(tx);

        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push(match event {
                AgentEvent::ToolCall { .. } => "tool_call",
                AgentEvent::ToolResult { .. } => "tool_result",
                AgentEvent::FinalAnswer { .. } => "final_answer",
                AgentEvent::Usage(_) => "usage",
            });
        }
        assert_eq!(kinds, vec!["tool_call", "tool_result", "final_answer", "usage"]);
    }

    #[tokio::test]
    async fn test_llm_error_aborts_run() {
        // Empty script: first call errors
        let executor = executor_with(vec![], None);
        let mut ctx = context();

        let err = executor.run(&mut ctx, "hi", None).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }

    #[test]
    fn test_summarize_truncates() {
        let long = "x".repeat(200);
        let summary = summarize(&long);
        assert!(summary.len() <= 121);
        assert!(summary.ends_with("..."));

        assert_eq!(summarize("Found 2 listings\nmore detail"), "Found 2 listings");
    }
}
