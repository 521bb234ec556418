//! OpenRouter chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ChatMessage, LlmClient};

const BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Request timeout. Long enough for a full itinerary generation on slower
/// models.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenRouterClient {
    api_key: String,
    http: reqwest::Client,
}

impl OpenRouterClient {
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
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
        session: &str,
    ) -> anyhow::Result<ChatMessage> {
        let mut body = json!({
            "model": model,
            "messages": messages,
            "temperature": 0.3,
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
            .header("HTTP-Referer", "http://localhost:8001")
            .header("X-Title", "Wayfarer Travel Planner")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenRouter returned {}: {}", status, detail);
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| anyhow::anyhow!("OpenRouter response contained no choices"))
    }
}
