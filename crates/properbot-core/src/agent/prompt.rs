//! System prompt assembly for the structured-chat agent.
//!
//! The prompt uses XML tags for section boundaries so the model can
//! distinguish persona, tool contracts, remembered search state, and the
//! response-format rules.
//!
//! Layout:
//! ```text
//! <persona>...</persona>
//! <tools>one block per registered tool</tools>
//! <search_context>remembered structured query</search_context>
//! <response_format>the action JSON contract</response_format>
//! ```

use properbot_types::listing::ListingQuery;

use crate::tool::registry::ToolSpec;

use super::action::FINAL_ANSWER_ACTION;

/// Builds the system prompt from the tool registry and conversation state.
pub struct SystemPromptBuilder;

impl SystemPromptBuilder {
    /// Build the complete system prompt.
    pub fn build(tools: &[ToolSpec], last_query: Option<&ListingQuery>) -> String {
        let mut sections = Vec::with_capacity(4);

        sections.push(
            "<persona>\n\
            You are ProperBot, a real-estate assistant. You answer questions \
            about houses on the market (availability, prices, bedrooms, \
            garages, HOA fees) using live marketplace data fetched through \
            your tools. Never invent listings; every property fact in your \
            answers must come from a tool observation.\n\
            </persona>"
                .to_string(),
        );

        if !tools.is_empty() {
            let tool_blocks: Vec<String> = tools
                .iter()
                .map(|spec| {
                    format!(
                        "<tool name=\"{}\">\n{}\nArguments schema:\n{}\n</tool>",
                        spec.name,
                        spec.description,
                        serde_json::to_string_pretty(&spec.parameters)
                            .unwrap_or_else(|_| "{}".to_string())
                    )
                })
                .collect();
            sections.push(format!("<tools>\n{}\n</tools>", tool_blocks.join("\n\n")));
        }

        if let Some(query) = last_query {
            sections.push(format!(
                "<search_context>\n\
                The current search, built up over this conversation:\n\
                {}\n\
                When the user refines the search (\"only ones with a garage\", \
                \"under a million\"), pass just the changed fields; unchanged \
                fields carry over automatically.\n\
                </search_context>",
                serde_json::to_string_pretty(query).unwrap_or_else(|_| "{}".to_string())
            ));
        }

        sections.push(format!(
            "<response_format>\n\
            Every response must be a single JSON object inside a fenced code \
            block:\n\
            ```json\n\
            {{\"action\": \"<tool name>\", \"action_input\": {{<arguments>}}}}\n\
            ```\n\
            To reply to the user, use the action \"{FINAL_ANSWER_ACTION}\" with \
            your reply text as action_input:\n\
            ```json\n\
            {{\"action\": \"{FINAL_ANSWER_ACTION}\", \"action_input\": \"<reply>\"}}\n\
            ```\n\
            After a tool action you will receive an Observation message with \
            the result. Use as many tool steps as needed, then give the final \
            answer. Output nothing outside the fenced block.\n\
            </response_format>"
        ));

        sections.join("\n\n")
    }
}
