//! Conversation state for one planning request.

use crate::llm::{ChatMessage, Role};

/// Append-only message history plus the cumulative tool-call count.
///
/// `tool_calls_made` always equals the total number of tool-call requests
/// carried by assistant messages appended so far; [`Conversation::push`]
/// maintains that invariant, so the counter never decreases and cannot
/// drift from the history. One instance exists per planning request and
/// is discarded when the loop terminates.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    tool_calls_made: usize,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation opened by a single user request.
    pub fn starting_with(user_request: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push(ChatMessage::user(user_request));
        conversation
    }

    /// Prepend the standing system instruction unless one is already
    /// first in the history.
    pub fn ensure_system_prompt(&mut self, prompt: &str) {
        let has_system = self
            .messages
            .first()
            .is_some_and(|message| message.role == Role::System);
        if !has_system {
            self.messages.insert(0, ChatMessage::system(prompt));
        }
    }

    /// Append a message. Assistant messages carrying tool-call requests
    /// bump the counter by the number of requests.
    pub fn push(&mut self, message: ChatMessage) {
        if message.role == Role::Assistant {
            if let Some(calls) = &message.tool_calls {
                self.tool_calls_made += calls.len();
            }
        }
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn tool_calls_made(&self) -> usize {
        self.tool_calls_made
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{FunctionCall, ToolCall};

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "search_flights".to_string(),
                arguments: "{}".to_string(),
            },
        }
    }

    #[test]
    fn counter_tracks_assistant_tool_calls() {
        let mut conversation = Conversation::starting_with("plan a trip");
        assert_eq!(conversation.tool_calls_made(), 0);

        let mut with_calls = ChatMessage::assistant("checking flights");
        with_calls.tool_calls = Some(vec![call("a"), call("b")]);
        conversation.push(with_calls);
        assert_eq!(conversation.tool_calls_made(), 2);

        conversation.push(ChatMessage::tool_result("a", "result"));
        conversation.push(ChatMessage::assistant("done"));
        assert_eq!(conversation.tool_calls_made(), 2);
    }

    #[test]
    fn system_prompt_is_prepended_once() {
        let mut conversation = Conversation::starting_with("plan a trip");
        conversation.ensure_system_prompt("you are a planner");
        conversation.ensure_system_prompt("you are a planner");

        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[0].role, Role::System);
        assert_eq!(conversation.messages()[1].role, Role::User);
    }
}
