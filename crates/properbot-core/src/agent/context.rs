//! Agent conversation context.
//!
//! AgentContext holds the state one run needs: LLM settings, the assembled
//! system prompt, the windowed conversation history, and the structured
//! query carried over from prior turns.

use properbot_types::agent::AgentConfig;
use properbot_types::listing::ListingQuery;
use properbot_types::llm::Message;

use crate::memory::window::WindowMemory;

/// Holds all state needed for an agent conversation.
///
/// Created at session start, then tracks conversation history and the
/// extracted query state throughout the session. The caller appends
/// messages after each completed exchange.
#[derive(Debug, Clone)]
pub struct AgentContext {
    /// LLM configuration for this conversation.
    pub agent_config: AgentConfig,
    /// Pre-built system prompt (persona + tools + search context + format).
    pub system_prompt: String,
    /// Running conversation history (user + assistant messages).
    pub conversation_history: Vec<Message>,
    /// Structured query from the most recent search turn.
    pub last_query: Option<ListingQuery>,
    window: WindowMemory,
}

impl AgentContext {
    /// Create a new agent context.
    pub fn new(
        config: AgentConfig,
        system_prompt: String,
        last_query: Option<ListingQuery>,
    ) -> Self {
        let window = WindowMemory::new(config.window_turns);
        Self {
            agent_config: config,
            system_prompt,
            conversation_history: Vec::new(),
            last_query,
            window,
        }
    }

    /// Add a user message to the conversation history.
    pub fn add_user_message(&mut self, content: String) {
        self.conversation_history.push(Message::user(content));
    }

    /// Add an assistant message to the conversation history.
    pub fn add_assistant_message(&mut self, content: String) {
        self.conversation_history.push(Message::assistant(content));
    }

    /// Record the structured query produced by a search turn.
    pub fn set_last_query(&mut self, query: ListingQuery) {
        self.last_query = Some(query);
    }

    /// Build the message list for an LLM request.
    ///
    /// Returns the windowed slice of conversation history. The system
    /// prompt is sent separately, not as a message.
    pub fn build_messages(&self) -> Vec<Message> {
        self.window.windowed(&self.conversation_history).to_vec()
    }
}
