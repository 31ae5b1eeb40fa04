//! Session title generation via LLM.
//!
//! `generate_title` creates a short, descriptive title for a chat session
//! based on the first user-assistant exchange.

use properbot_types::llm::{CompletionRequest, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;

/// System prompt for the title generation LLM call.
const TITLE_SYSTEM_PROMPT: &str = r#"Generate a short, descriptive title (3-7 words) for this conversation based on the first exchange. The title should capture the main topic or intent. Return ONLY the title text, nothing else.

Examples:
- "Three-bedroom homes in San Mateo"
- "Rentals near downtown with parking"
- "Recently sold prices on Elm St""#;

/// Generate a session title from the first user-assistant exchange.
///
/// Uses an LLM call at low temperature (0.3) with a strict prompt to
/// produce a concise title. The result is trimmed of whitespace and
/// surrounding quotes.
#[tracing::instrument(
    name = "generate_title",
    skip(provider, first_user_message, first_assistant_message),
    fields(model = %model)
)]
pub async fn generate_title(
    provider: &BoxLlmProvider,
    first_user_message: &str,
    first_assistant_message: &str,
    model: &str,
) -> Result<String, LlmError> {
    let request = CompletionRequest {
        model: model.to_string(),
        messages: vec![
            Message::user(first_user_message),
            Message::assistant(first_assistant_message),
            Message::user("Based on our exchange above, generate a title."),
        ],
        system: Some(TITLE_SYSTEM_PROMPT.to_string()),
        max_tokens: 50,
        temperature: Some(0.3),
        stream: false,
        stop_sequences: None,
    };

    let response = provider.complete(&request).await?;

    let title = response
        .content
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string();

    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_trimming() {
        let raw = "  \"Homes in San Mateo\"  ";
        let title = raw.trim().trim_matches('"').trim_matches('\'').trim();
        assert_eq!(title, "Homes in San Mateo");
    }

    #[test]
    fn test_title_trimming_single_quotes() {
        let raw = "'Rentals with parking'";
        let title = raw.trim().trim_matches('"').trim_matches('\'').trim();
        assert_eq!(title, "Rentals with parking");
    }

    #[test]
    fn test_title_system_prompt_constraints() {
        assert!(TITLE_SYSTEM_PROMPT.contains("3-7 words"));
        assert!(TITLE_SYSTEM_PROMPT.contains("ONLY the title text"));
    }
}
