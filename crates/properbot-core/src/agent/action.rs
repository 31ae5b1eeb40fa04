//! Structured action parsing.
//!
//! The model is instructed to reply with a JSON object of the shape
//! `{"action": "<tool name or Final Answer>", "action_input": ...}`,
//! ideally inside a fenced code block. Models drift: the parser accepts a
//! fenced block, a bare JSON reply, or an object embedded in prose, in
//! that order.

use serde::Deserialize;
use thiserror::Error;

use properbot_types::agent::AgentAction;

/// Action name that ends the loop with a reply to the user.
pub const FINAL_ANSWER_ACTION: &str = "Final Answer";

/// Why a model response could not be parsed into an action.
#[derive(Debug, Error)]
pub enum ActionParseError {
    #[error("no JSON object found in the response")]
    NoJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("JSON object has no \"action\" field")]
    MissingAction,

    #[error("\"action\" must be a string, got: {0}")]
    ActionNotString(String),
}

/// Wire shape of a structured-chat action.
#[derive(Debug, Deserialize)]
struct RawAction {
    action: Option<serde_json::Value>,
    #[serde(default)]
    action_input: serde_json::Value,
}

/// Parse a model response into an [`AgentAction`].
pub fn parse_action(response: &str) -> Result<AgentAction, ActionParseError> {
    let candidate = extract_json(response)?;

    let raw: RawAction = serde_json::from_str(&candidate)
        .map_err(|e| ActionParseError::InvalidJson(e.to_string()))?;

    let action = raw.action.ok_or(ActionParseError::MissingAction)?;
    let name = action
        .as_str()
        .ok_or_else(|| ActionParseError::ActionNotString(action.to_string()))?
        .trim()
        .to_string();

    if name.eq_ignore_ascii_case(FINAL_ANSWER_ACTION) {
        let text = match raw.action_input {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        Ok(AgentAction::FinalAnswer { text })
    } else {
        Ok(AgentAction::Tool {
            name,
            input: raw.action_input,
        })
    }
}

/// Pull the JSON candidate out of a response.
///
/// Preference order: first fenced code block, then the whole trimmed text,
/// then the substring from the first `{` to the last `}`.
fn extract_json(response: &str) -> Result<String, ActionParseError> {
    if let Some(block) = extract_fenced_block(response) {
        return Ok(block);
    }

    let trimmed = response.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed.to_string());
    }

    let start = trimmed.find('{').ok_or(ActionParseError::NoJson)?;
    let end = trimmed.rfind('}').ok_or(ActionParseError::NoJson)?;
    if end <= start {
        return Err(ActionParseError::NoJson);
    }
    Ok(trimmed[start..=end].to_string())
}

/// Contents of the first ``` fenced block, with any language tag stripped.
fn extract_fenced_block(response: &str) -> Option<String> {
    let open = response.find("```")?;
    let after_open = &response[open + 3..];
    let close = after_open.find("```")?;
    let mut block = &after_open[..close];

    // Strip a language tag like "json" on the opening line
    if let Some(newline) = block.find('\n') {
        let first_line = block[..newline].trim();
        if !first_line.is_empty() && !first_line.contains('{') {
            block = &block[newline + 1..];
        }
    }

    let block = block.trim();
    if block.is_empty() { None } else { Some(block.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_tool_action() {
        let response = r#"I should search for listings.

```json
{
  "action": "home_search",
  "action_input": {"location": "San Mateo, CA", "radius": 3.0}
}
```"#;

        let action = parse_action(response).unwrap();
        match action {
            AgentAction::Tool { name, input } => {
                assert_eq!(name, "home_search");
                assert_eq!(input["location"], "San Mateo, CA");
            }
            other => panic!("expected tool action, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_fenced_without_language_tag() {
        let response = "```\n{\"action\": \"home_search\", \"action_input\": {\"location\": \"94401\"}}\n```";
        let action = parse_action(response).unwrap();
        assert!(matches!(action, AgentAction::Tool { .. }));
    }

    #[test]
    fn test_parse_bare_json() {
        let response = r#"{"action": "Final Answer", "action_input": "There are 3 houses for sale."}"#;
        let action = parse_action(response).unwrap();
        assert_eq!(
            action,
            AgentAction::FinalAnswer {
                text: "There are 3 houses for sale.".to_string()
            }
        );
    }

    #[test]
    fn test_parse_embedded_json() {
        let response = r#"Here is my action: {"action": "home_search", "action_input": {"location": "San Mateo, CA"}} -- done."#;
        let action = parse_action(response).unwrap();
        assert!(matches!(action, AgentAction::Tool { .. }));
    }

    #[test]
    fn test_final_answer_case_insensitive() {
        let response = r#"{"action": "final answer", "action_input": "Done."}"#;
        let action = parse_action(response).unwrap();
        assert!(matches!(action, AgentAction::FinalAnswer { .. }));
    }

    #[test]
    fn test_final_answer_object_input_stringified() {
        let response = r#"{"action": "Final Answer", "action_input": {"summary": "3 houses"}}"#;
        match parse_action(response).unwrap() {
            AgentAction::FinalAnswer { text } => assert!(text.contains("3 houses")),
            other => panic!("expected final answer, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_action_input_defaults_to_null() {
        let response = r#"{"action": "home_search"}"#;
        match parse_action(response).unwrap() {
            AgentAction::Tool { input, .. } => assert!(input.is_null()),
            other => panic!("expected tool action, got {other:?}"),
        }
    }

    #[test]
    fn test_no_json_is_an_error() {
        let err = parse_action("I couldn't decide what to do.").unwrap_err();
        assert!(matches!(err, ActionParseError::NoJson));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = parse_action("```json\n{\"action\": \n```").unwrap_err();
        assert!(matches!(err, ActionParseError::InvalidJson(_)));
    }

    #[test]
    fn test_missing_action_field_is_an_error() {
        let err = parse_action(r#"{"action_input": {"location": "x"}}"#).unwrap_err();
        assert!(matches!(err, ActionParseError::MissingAction));
    }

    #[test]
    fn test_non_string_action_is_an_error() {
        let err = parse_action(r#"{"action": 42}"#).unwrap_err();
        assert!(matches!(err, ActionParseError::ActionNotString(_)));
    }
}
