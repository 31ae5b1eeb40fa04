//! Tool abstraction for the structured-chat agent.
//!
//! A `Tool` publishes a name, a description, and a JSON schema for its
//! arguments; the agent's prompt advertises all three, and the executor
//! dispatches parsed actions through the `ToolRegistry`.

pub mod home_search;
pub mod registry;

use std::future::Future;
use std::pin::Pin;

use properbot_types::error::ToolError;
use properbot_types::listing::ListingQuery;

/// Per-invocation context threaded from the conversation state.
///
/// Carries the extracted entities of prior turns (currently the last
/// structured query) so tools can interpret partial follow-up arguments.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Structured query from the most recent search turn, if any.
    pub last_query: Option<ListingQuery>,
}

/// Result of a tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Text fed back to the model as the observation.
    pub observation: String,
    /// Updated extracted-entity state to persist on the session.
    pub updated_query: Option<ListingQuery>,
}

impl ToolOutput {
    /// An observation with no state change.
    pub fn text(observation: impl Into<String>) -> Self {
        Self {
            observation: observation.into(),
            updated_query: None,
        }
    }
}

/// Trait for tools the agent can invoke.
///
/// Uses native async fn in traits (RPITIT); `BoxTool` provides the
/// object-safe wrapper the registry stores.
pub trait Tool: Send + Sync {
    /// Unique tool name the model addresses it by.
    fn name(&self) -> &str;

    /// One-paragraph description shown in the system prompt.
    fn description(&self) -> &str;

    /// JSON schema of the tool's arguments.
    fn parameters(&self) -> serde_json::Value;

    /// Invoke the tool with parsed arguments.
    fn invoke(
        &self,
        input: serde_json::Value,
        ctx: &ToolContext,
    ) -> impl Future<Output = Result<ToolOutput, ToolError>> + Send;
}

/// Object-safe version of [`Tool`] with boxed futures.
pub trait ToolDyn: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> serde_json::Value;

    fn invoke_boxed<'a>(
        &'a self,
        input: serde_json::Value,
        ctx: &'a ToolContext,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutput, ToolError>> + Send + 'a>>;
}

impl<T: Tool> ToolDyn for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> &str {
        Tool::description(self)
    }

    fn parameters(&self) -> serde_json::Value {
        Tool::parameters(self)
    }

    fn invoke_boxed<'a>(
        &'a self,
        input: serde_json::Value,
        ctx: &'a ToolContext,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutput, ToolError>> + Send + 'a>> {
        Box::pin(self.invoke(input, ctx))
    }
}

/// Type-erased tool stored by the registry.
pub struct BoxTool {
    inner: Box<dyn ToolDyn + Send + Sync>,
}

impl BoxTool {
    /// Wrap a concrete `Tool` in a type-erased box.
    pub fn new<T: Tool + 'static>(tool: T) -> Self {
        Self {
            inner: Box::new(tool),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn description(&self) -> &str {
        self.inner.description()
    }

    pub fn parameters(&self) -> serde_json::Value {
        self.inner.parameters()
    }

    pub async fn invoke(
        &self,
        input: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        self.inner.invoke_boxed(input, ctx).await
    }
}
