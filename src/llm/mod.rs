//! LLM backends.
//!
//! Wire types follow the OpenAI chat-completions format, which both
//! supported backends speak. The backend is chosen once at startup from
//! configuration; everything past [`client_for`] only sees `dyn LlmClient`.

mod groq;
mod openrouter;

pub use groq::GroqClient;
pub use openrouter::OpenRouterClient;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{Config, ModelProvider};

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One turn in a conversation. Immutable once appended to a history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Tool-call requests attached to an assistant message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// For `tool` messages: which call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// A `tool` message answering the call with id `call_id`.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Whether this message carries at least one tool-call request.
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// A model-issued request to invoke a tool. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,

    #[serde(rename = "type", default = "function_call_type")]
    pub call_type: String,

    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,

    /// JSON-encoded argument object, exactly as sent on the wire.
    pub arguments: String,
}

fn function_call_type() -> String {
    "function".to_string()
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One chat-completion round trip.
    ///
    /// `tools` is the function-schema list to expose to the model. When it
    /// is `None`, tool calling is disabled for the turn and the returned
    /// message carries no tool-call requests. `session` is the per-request
    /// correlation id, forwarded to the backend for session isolation.
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
        session: &str,
    ) -> anyhow::Result<ChatMessage>;
}

/// Build the client for the configured backend.
pub fn client_for(config: &Config) -> Arc<dyn LlmClient> {
    match config.model_provider {
        ModelProvider::OpenRouter => Arc::new(OpenRouterClient::new(config.llm_api_key.clone())),
        ModelProvider::Groq => Arc::new(GroqClient::new(config.llm_api_key.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::tool_result("call-1", "ok");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call-1");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn tool_call_deserializes_from_wire_format() {
        let call: ToolCall = serde_json::from_str(
            r#"{"id":"call-7","type":"function","function":{"name":"search_flights","arguments":"{\"origin\":\"DEL\"}"}}"#,
        )
        .unwrap();
        assert_eq!(call.function.name, "search_flights");
        assert!(call.function.arguments.contains("DEL"));
    }

    #[test]
    fn has_tool_calls_ignores_empty_list() {
        let mut msg = ChatMessage::assistant("done");
        assert!(!msg.has_tool_calls());
        msg.tool_calls = Some(vec![]);
        assert!(!msg.has_tool_calls());
    }
}
