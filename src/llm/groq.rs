//! Groq chat-completions client.
//!
//! Groq exposes the same OpenAI-compatible wire format as OpenRouter but
//! on its own endpoint and with its own model catalog.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ChatMessage, LlmClient};

const BASE_URL: &str = "https://api.groq.com/openai/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct GroqClient {
    api_key: String,
    http: reqwest::Client,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
        session: &str,
    ) -> anyhow::Result<ChatMessage> {
        // Lower temperature than the OpenRouter path: the Groq-hosted
        // models drift into invented place names above ~0.1.
        let mut body = json!({
            "model": model,
            "messages": messages,
            "temperature": 0.1,
            "max_tokens": 8000,
            "user": session,
        });

        if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = Value::Array(tools.to_vec());
                body["tool_choice"] = json!("auto");
            }
        }

        let response = self
            .http
            .post(format!("{}/chat/completions", BASE_URL))
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Groq returned {}: {}", status, detail);
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| anyhow::anyhow!("Groq response contained no choices"))
    }
}
