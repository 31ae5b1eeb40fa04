//! Sliding window over conversation history.
//!
//! Keeps the prompt bounded by returning only the most recent K turns
//! (a turn is one user message plus the assistant response that follows).
//! Older turns fall off the window; the structured query carried on the
//! session preserves the search state they established.

use properbot_types::llm::{Message, MessageRole};

/// Default number of turns kept in the window.
pub const DEFAULT_WINDOW_TURNS: usize = 5;

/// Turn-counted sliding window over conversation history.
#[derive(Debug, Clone)]
pub struct WindowMemory {
    turns: usize,
}

impl WindowMemory {
    /// Create a window keeping the last `turns` exchanges.
    ///
    /// A zero turn count is clamped to 1: a windowless conversation
    /// cannot answer follow-ups at all.
    pub fn new(turns: usize) -> Self {
        Self {
            turns: turns.max(1),
        }
    }

    /// Number of turns this window retains.
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Select the windowed slice of a conversation history.
    ///
    /// Walks backward counting user messages (each user message starts a
    /// turn) and cuts the history at the start of the oldest retained turn.
    /// A leading orphaned assistant message is never produced.
    pub fn windowed<'a>(&self, history: &'a [Message]) -> &'a [Message] {
        let mut user_seen = 0;
        let mut start = 0;

        for (i, message) in history.iter().enumerate().rev() {
            if message.role == MessageRole::User {
                user_seen += 1;
                if user_seen == self.turns {
                    start = i;
                    break;
                }
            }
        }

        &history[start..]
    }
}

impl Default for WindowMemory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_TURNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: usize) -> [Message; 2] {
        [
            Message::user(format!("question {n}")),
            Message::assistant(format!("answer {n}")),
        ]
    }

    fn history_of(turns: usize) -> Vec<Message> {
        (0..turns).flat_map(turn).collect()
    }

    #[test]
    fn test_short_history_kept_whole() {
        let window = WindowMemory::new(5);
        let history = history_of(3);
        assert_eq!(window.windowed(&history).len(), 6);
    }

    #[test]
    fn test_long_history_trimmed_to_window() {
        let window = WindowMemory::new(5);
        let history = history_of(8);

        let windowed = window.windowed(&history);
        assert_eq!(windowed.len(), 10);
        // Oldest retained message is the user side of turn 3
        assert_eq!(windowed[0].content, "question 3");
        assert_eq!(windowed[0].role, MessageRole::User);
    }

    #[test]
    fn test_exact_boundary() {
        let window = WindowMemory::new(5);
        let history = history_of(5);
        assert_eq!(window.windowed(&history).len(), 10);
    }

    #[test]
    fn test_empty_history() {
        let window = WindowMemory::new(5);
        let history: Vec<Message> = Vec::new();
        assert!(window.windowed(&history).is_empty());
    }

    #[test]
    fn test_window_starts_on_user_message() {
        let window = WindowMemory::new(2);
        // History with an unpaired trailing user message
        let mut history = history_of(3);
        history.push(Message::user("question 3"));

        let windowed = window.windowed(&history);
        assert_eq!(windowed[0].role, MessageRole::User);
        // Turns counted: "question 3" (unpaired) and turn 2
        assert_eq!(windowed[0].content, "question 2");
    }

    #[test]
    fn test_zero_turns_clamped() {
        let window = WindowMemory::new(0);
        assert_eq!(window.turns(), 1);

        let history = history_of(4);
        let windowed = window.windowed(&history);
        assert_eq!(windowed.len(), 2);
        assert_eq!(windowed[0].content, "question 3");
    }

    #[test]
    fn test_default_window() {
        assert_eq!(WindowMemory::default().turns(), DEFAULT_WINDOW_TURNS);
    }
}
